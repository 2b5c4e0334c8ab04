// scoutshare-service/src/models/scouting.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MATCH_SCOUTS_COLLECTION: &str = "match_scouts";
pub const PIT_SCOUTS_COLLECTION: &str = "pit_scouts";
pub const PIT_IMAGES_BUCKET: &str = "pit_images";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchScout {
    pub id: String,
    pub event_id: String,
    pub team_number: u32,
    pub match_number: u32,
    pub alliance: Alliance,
    #[serde(default)]
    pub auto_points: u32,
    #[serde(default)]
    pub teleop_points: u32,
    #[serde(default)]
    pub endgame_points: u32,
    #[serde(default)]
    pub notes: String,
    pub created_by: String,
    pub created_by_name: String,
    #[serde(default)]
    pub last_edited_by: Option<String>,
    #[serde(default)]
    pub last_edited_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchScout {
    pub fn total_points(&self) -> u32 {
        self.auto_points
            .saturating_add(self.teleop_points)
            .saturating_add(self.endgame_points)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchScoutData {
    pub team_number: u32,
    pub match_number: u32,
    pub alliance: Alliance,
    #[serde(default)]
    pub auto_points: u32,
    #[serde(default)]
    pub teleop_points: u32,
    #[serde(default)]
    pub endgame_points: u32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PitScout {
    pub id: String,
    pub event_id: String,
    pub team_number: u32,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub drivetrain: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image_file_id: Option<String>,
    pub created_by: String,
    pub created_by_name: String,
    #[serde(default)]
    pub last_edited_by: Option<String>,
    #[serde(default)]
    pub last_edited_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PitScoutData {
    pub team_number: u32,
    pub team_name: Option<String>,
    pub drivetrain: Option<String>,
    #[serde(default)]
    pub notes: String,
}
