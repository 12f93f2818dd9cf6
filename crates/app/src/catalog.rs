//! Read-only farm and community data.
//!
//! The client never mutates these records; a real backend would sit behind
//! [`FarmDirectory`].

use agrointel_core::FarmId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub location: String,
    pub area: String,
    pub crop: String,
    /// Crop health score, 0–100.
    pub health: u8,
    #[serde(rename = "yield")]
    pub expected_yield: String,
    pub last_update: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: u32,
    pub question: String,
    pub author: String,
    pub time: String,
    pub answers: u32,
    pub tags: Vec<String>,
    pub votes: u32,
}

pub trait FarmDirectory: Send + Sync {
    fn farms(&self) -> &[Farm];

    fn farm(&self, id: FarmId) -> Option<&Farm> {
        self.farms().iter().find(|farm| farm.id == id)
    }

    fn community_posts(&self) -> &[CommunityPost];
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    farms: Vec<Farm>,
    posts: Vec<CommunityPost>,
}

impl StaticCatalog {
    pub fn new(farms: Vec<Farm>, posts: Vec<CommunityPost>) -> Self {
        Self { farms, posts }
    }

    /// Demo farms and posts shown until a backend exists.
    pub fn sample() -> Self {
        let farm = |id, name: &str, location: &str, area: &str, crop: &str, health, expected_yield: &str, last_update: &str, image_url: &str| Farm {
            id: FarmId(id),
            name: name.to_string(),
            location: location.to_string(),
            area: area.to_string(),
            crop: crop.to_string(),
            health,
            expected_yield: expected_yield.to_string(),
            last_update: last_update.to_string(),
            image_url: image_url.to_string(),
        };

        let farms = vec![
            farm(
                1,
                "Kuttanad Rice Field",
                "Alappuzha",
                "2.5 Acres",
                "Rice (Uma)",
                88,
                "3.5T",
                "4h ago",
                "https://images.unsplash.com/photo-1536617621572-1d5f1e6269a0?auto=format&fit=crop&q=80&w=800",
            ),
            farm(
                2,
                "Hilltop Spice Garden",
                "Idukki",
                "1.2 Acres",
                "Black Pepper",
                72,
                "400kg",
                "1d ago",
                "https://images.unsplash.com/photo-1599522316624-a5e2d6349925?auto=format&fit=crop&q=80&w=800",
            ),
            farm(
                3,
                "Coastal Grove",
                "Kozhikode",
                "50 Trees",
                "Coconut",
                94,
                "Healthy",
                "2d ago",
                "https://images.unsplash.com/photo-1534234528563-02d3174294d6?auto=format&fit=crop&q=80&w=800",
            ),
        ];

        let posts = vec![
            CommunityPost {
                id: 1,
                question: "Yellowing leaves in coconut tree?".to_string(),
                author: "Ravi Kumar".to_string(),
                time: "2h ago".to_string(),
                answers: 5,
                tags: vec!["Coconut".to_string(), "Disease".to_string()],
                votes: 24,
            },
            CommunityPost {
                id: 2,
                question: "Best time to harvest pepper in Wayanad?".to_string(),
                author: "Sarah Thomas".to_string(),
                time: "5h ago".to_string(),
                answers: 2,
                tags: vec!["Pepper".to_string(), "Harvest".to_string()],
                votes: 8,
            },
        ];

        Self::new(farms, posts)
    }
}

impl FarmDirectory for StaticCatalog {
    fn farms(&self) -> &[Farm] {
        &self.farms
    }

    fn community_posts(&self) -> &[CommunityPost] {
        &self.posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_lookup_by_id() {
        let catalog = StaticCatalog::sample();
        assert_eq!(catalog.farms().len(), 3);
        assert_eq!(catalog.farm(FarmId(2)).map(|f| f.crop.as_str()), Some("Black Pepper"));
        assert!(catalog.farm(FarmId(9)).is_none());
        assert_eq!(catalog.community_posts()[0].votes, 24);
    }

    #[test]
    fn farm_serializes_yield_under_its_display_name() {
        let catalog = StaticCatalog::sample();
        let json = serde_json::to_value(&catalog.farms()[0]).unwrap();
        assert_eq!(json["yield"], "3.5T");
        assert_eq!(json["id"], 1);
    }
}
