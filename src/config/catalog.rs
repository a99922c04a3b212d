use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::Event;

/// The set of events the server is seeded with at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub events: Vec<Event>,
}

impl CatalogConfig {
    /// Load a catalog from a JSON file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::CatalogLoad {
            path: path.to_string(),
            source: e,
        })?;

        let catalog = Self::parse(&content).map_err(|e| AppError::CatalogParse {
            path: path.to_string(),
            source: e,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Accepts either `{"events": [...]}` or a bare array of events
    fn parse(content: &str) -> serde_json::Result<Self> {
        if let Ok(config) = serde_json::from_str::<CatalogConfig>(content) {
            return Ok(config);
        }

        let events: Vec<Event> = serde_json::from_str(content)?;
        Ok(CatalogConfig { events })
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for event in &self.events {
            if !seen.insert(event.id) {
                return Err(AppError::CatalogValidation {
                    message: format!("duplicate event id {}", event.id),
                });
            }
        }
        Ok(())
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            events: vec![
                demo_event(101, "Club Fair", "Social", "2025-11-10T10:00:00", "Student Center", 1, 0, false, 20, 88),
                demo_event(102, "ML Workshop: Intro to LLMs", "Workshop", "2025-11-12T13:00:00", "Brickyard 210", 1, 10, true, 8, 76),
                demo_event(103, "Tech Talk: Building Scalable APIs", "Tech Talk", "2025-11-15T16:00:00", "Engineering Hall", 2, 0, false, 15, 70),
                demo_event(104, "Hack Night", "Social", "2025-11-20T18:30:00", "Polytechnic Lab 2", 3, 5, false, 12, 82),
            ],
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn demo_event(
    id: u64,
    title: &str,
    category: &str,
    date: &str,
    location: &str,
    club_id: u64,
    price: u32,
    requires_verification: bool,
    spots_left: u32,
    popularity: u32,
) -> Event {
    Event {
        id,
        title: title.to_string(),
        category: category.to_string(),
        // Seeded dates are pinned by test_default_catalog_dates
        date: chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S")
            .unwrap_or_default(),
        location: location.to_string(),
        club_id,
        free: price == 0,
        price,
        requires_verification,
        spots_left,
        popularity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = CatalogConfig::default();
        assert_eq!(catalog.event_count(), 4);
        assert!(catalog.validate().is_ok());

        let workshop = catalog.events.iter().find(|e| e.id == 102).unwrap();
        assert!(workshop.requires_verification);
        assert!(workshop.requires_payment());
        assert_eq!(workshop.date.to_string(), "2025-11-12 13:00:00");

        let fair = catalog.events.iter().find(|e| e.id == 101).unwrap();
        assert!(fair.free);
        assert!(!fair.requires_payment());
    }

    #[test]
    fn test_default_catalog_dates() {
        let catalog = CatalogConfig::default();
        let dates: Vec<(u64, String)> = catalog
            .events
            .iter()
            .map(|e| (e.id, e.date.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .collect();

        assert_eq!(
            dates,
            vec![
                (101, "2025-11-10T10:00:00".to_string()),
                (102, "2025-11-12T13:00:00".to_string()),
                (103, "2025-11-15T16:00:00".to_string()),
                (104, "2025-11-20T18:30:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[
            {"id": 1, "title": "Quiz", "category": "Social", "date": "2026-01-01T19:00:00",
             "location": "Pub", "clubId": 4, "free": true, "spotsLeft": 30}
        ]"#;

        let catalog = CatalogConfig::parse(json).unwrap();
        assert_eq!(catalog.event_count(), 1);
        assert_eq!(catalog.events[0].price, 0);
    }

    #[test]
    fn test_parse_wrapped_format() {
        let json = r#"{"events": [
            {"id": 1, "title": "Quiz", "category": "Social", "date": "2026-01-01T19:00:00",
             "location": "Pub", "clubId": 4, "free": false, "price": 3, "spotsLeft": 30}
        ]}"#;

        let catalog = CatalogConfig::parse(json).unwrap();
        assert!(catalog.events[0].requires_payment());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut catalog = CatalogConfig::default();
        let dup = catalog.events[0].clone();
        catalog.events.push(dup);

        assert!(matches!(
            catalog.validate(),
            Err(AppError::CatalogValidation { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = CatalogConfig::load_from_file("does/not/exist.json");
        assert!(matches!(result, Err(AppError::CatalogLoad { .. })));
    }
}
