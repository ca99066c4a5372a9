//! Full-screen slideshow over publications that have images.

use super::gesture::Direction;
use crate::models::Publication;

#[derive(Debug, Clone)]
pub struct Slideshow {
    publications: Vec<Publication>,
    current: usize,
    image: usize,
}

impl Slideshow {
    /// Build a slideshow, keeping only publications with at least one image.
    ///
    /// Starts on `initial_id` when it survives the filter, else on the first.
    pub fn new(publications: Vec<Publication>, initial_id: Option<i64>) -> Self {
        let publications: Vec<_> = publications
            .into_iter()
            .filter(|p| !p.images.is_empty())
            .collect();

        let current = initial_id
            .and_then(|id| publications.iter().position(|p| p.id == id))
            .unwrap_or(0);

        Self {
            publications,
            current,
            image: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.publications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publications.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.current)
    }

    pub fn current(&self) -> Option<&Publication> {
        self.publications.get(self.current)
    }

    pub fn image_index(&self) -> usize {
        self.image
    }

    pub fn current_image(&self) -> Option<&str> {
        self.current()
            .and_then(|p| p.images.get(self.image))
            .map(String::as_str)
    }

    pub fn next(&mut self) {
        self.move_publication(Direction::Forward);
    }

    pub fn previous(&mut self) {
        self.move_publication(Direction::Backward);
    }

    pub fn next_image(&mut self) {
        self.move_image(Direction::Forward);
    }

    pub fn previous_image(&mut self) {
        self.move_image(Direction::Backward);
    }

    fn move_publication(&mut self, direction: Direction) {
        if self.is_empty() {
            return;
        }
        self.current = direction.step(self.current, self.len());
        self.image = 0;
    }

    fn move_image(&mut self, direction: Direction) {
        let count = self.current().map_or(0, |p| p.images.len());
        if count > 0 {
            self.image = direction.step(self.image, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publication(id: i64, images: &[&str]) -> Publication {
        Publication {
            id,
            title: format!("Publication {}", id),
            authors: String::new(),
            journal: None,
            volume: None,
            issue: None,
            page_from: None,
            page_to: None,
            year: None,
            online_pub_date: None,
            doi: None,
            beamlines: None,
            verified: false,
            high_impact: false,
            category: "General".to_string(),
            tags: None,
            images: images.iter().map(|s| s.to_string()).collect(),
            abstract_text: None,
            key_points: vec![],
            created_at: None,
        }
    }

    fn sample() -> Vec<Publication> {
        vec![
            publication(1, &["a1", "a2", "a3"]),
            publication(2, &[]),
            publication(3, &["c1"]),
            publication(4, &["d1", "d2"]),
        ]
    }

    #[test]
    fn test_filters_publications_without_images() {
        let slideshow = Slideshow::new(sample(), None);
        assert_eq!(slideshow.len(), 3);
        assert_eq!(slideshow.current().map(|p| p.id), Some(1));
    }

    #[test]
    fn test_initial_publication() {
        let slideshow = Slideshow::new(sample(), Some(4));
        assert_eq!(slideshow.current_index(), Some(2));
        // Filtered out, falls back to the first
        let slideshow = Slideshow::new(sample(), Some(2));
        assert_eq!(slideshow.current_index(), Some(0));
    }

    #[test]
    fn test_navigation_wraps_and_resets_image() {
        let mut slideshow = Slideshow::new(sample(), None);
        slideshow.next_image();
        slideshow.next_image();
        assert_eq!(slideshow.current_image(), Some("a3"));
        slideshow.next_image();
        assert_eq!(slideshow.current_image(), Some("a1"));
        slideshow.previous_image();
        assert_eq!(slideshow.current_image(), Some("a3"));

        slideshow.previous();
        assert_eq!(slideshow.current().map(|p| p.id), Some(4));
        assert_eq!(slideshow.image_index(), 0);
        slideshow.next();
        assert_eq!(slideshow.current().map(|p| p.id), Some(1));
    }

    #[test]
    fn test_empty_slideshow() {
        let mut slideshow = Slideshow::new(vec![publication(1, &[])], None);
        slideshow.next();
        slideshow.next_image();
        assert!(slideshow.is_empty());
        assert_eq!(slideshow.current_index(), None);
        assert_eq!(slideshow.current_image(), None);
    }
}
