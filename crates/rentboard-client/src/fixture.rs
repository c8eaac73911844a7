//! In-memory backend seeded from a JSON fixture file, for offline serving and tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rentboard_core::{
    CreateServiceConfigInput, CreateServiceScheduleInput, Room, RoomFormData, ServiceConfig,
    ServiceSchedule,
};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::{ApiError, RentalApi};

/// Days ahead that count as "upcoming" for service visits.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("reading fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Accepts either a bare `GET /room` dump or an object with all collections.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FixtureFile {
    Rooms(Vec<Room>),
    Full {
        rooms: Vec<Room>,
        #[serde(default, rename = "serviceConfigs")]
        service_configs: Vec<ServiceConfig>,
        #[serde(default, rename = "serviceSchedules")]
        service_schedules: Vec<ServiceSchedule>,
    },
}

#[derive(Debug, Default)]
struct FixtureState {
    rooms: Vec<Room>,
    configs: Vec<ServiceConfig>,
    schedules: Vec<ServiceSchedule>,
}

impl FixtureState {
    fn next_room_id(&self) -> String {
        let max = self
            .rooms
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }

    fn next_config_id(&self) -> i64 {
        self.configs.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    fn next_schedule_id(&self) -> i64 {
        self.schedules.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }
}

#[derive(Debug, Default)]
pub struct FixtureBackend {
    state: Mutex<FixtureState>,
}

impl FixtureBackend {
    pub fn new(file: FixtureFile) -> Self {
        let state = match file {
            FixtureFile::Rooms(rooms) => FixtureState {
                rooms,
                ..FixtureState::default()
            },
            FixtureFile::Full {
                rooms,
                service_configs,
                service_schedules,
            } => FixtureState {
                rooms,
                configs: service_configs,
                schedules: service_schedules,
            },
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn from_rooms(rooms: Vec<Room>) -> Self {
        Self::new(FixtureFile::Rooms(rooms))
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let file: FixtureFile =
            serde_json::from_str(&text).map_err(|source| FixtureError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let rooms = match &file {
            FixtureFile::Rooms(rooms) | FixtureFile::Full { rooms, .. } => rooms.len(),
        };
        info!(path = %path.display(), rooms, "loaded fixture backend");
        Ok(Self::new(file))
    }
}

#[async_trait]
impl RentalApi for FixtureBackend {
    fn backend_name(&self) -> &'static str {
        "fixture"
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, ApiError> {
        Ok(self.state.lock().await.rooms.clone())
    }

    async fn create_room(&self, data: &RoomFormData) -> Result<Room, ApiError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let mut room = Room {
            id: state.next_room_id(),
            name: String::new(),
            description: None,
            amenities: Vec::new(),
            price: 0.0,
            location: String::new(),
            images: Vec::new(),
            bed: 1,
            status: data.status,
            room_size: None,
            property_type: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        room.apply_form(data);
        state.rooms.push(room.clone());
        Ok(room)
    }

    async fn update_room(&self, id: &str, data: &RoomFormData) -> Result<Room, ApiError> {
        let mut state = self.state.lock().await;
        let room = state
            .rooms
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("room {id}")))?;
        room.apply_form(data);
        room.updated_at = Some(Utc::now());
        Ok(room.clone())
    }

    async fn delete_room(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        let before = state.rooms.len();
        state.rooms.retain(|r| r.id != id);
        if state.rooms.len() == before {
            return Err(ApiError::NotFound(format!("room {id}")));
        }
        Ok(())
    }

    async fn list_service_configs(&self) -> Result<Vec<ServiceConfig>, ApiError> {
        Ok(self.state.lock().await.configs.clone())
    }

    async fn create_service_config(
        &self,
        input: &CreateServiceConfigInput,
    ) -> Result<ServiceConfig, ApiError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let config = ServiceConfig {
            id: state.next_config_id(),
            service_type: input.service_type,
            frequency: input.frequency,
            description: input.description.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        state.configs.push(config.clone());
        Ok(config)
    }

    async fn list_service_schedules(&self) -> Result<Vec<ServiceSchedule>, ApiError> {
        Ok(self.state.lock().await.schedules.clone())
    }

    async fn create_service_schedule(
        &self,
        input: &CreateServiceScheduleInput,
    ) -> Result<ServiceSchedule, ApiError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let schedule = ServiceSchedule {
            id: state.next_schedule_id(),
            service_type: input.service_type,
            frequency: input.frequency,
            room_id: input.room_id,
            room_name: input.room_name.clone(),
            description: input.description.clone(),
            is_active: input.is_active,
            last_performed: None,
            next_due: now,
            created_at: now,
            updated_at: now,
        };
        state.schedules.push(schedule.clone());
        Ok(schedule)
    }

    async fn complete_service_schedule(&self, id: i64) -> Result<ServiceSchedule, ApiError> {
        let mut state = self.state.lock().await;
        let schedule = state
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("service schedule {id}")))?;
        schedule.mark_completed(Utc::now());
        Ok(schedule.clone())
    }

    async fn upcoming_services(&self) -> Result<Vec<ServiceSchedule>, ApiError> {
        let now = Utc::now();
        let mut upcoming = self
            .state
            .lock()
            .await
            .schedules
            .iter()
            .filter(|s| s.is_due_within(now, UPCOMING_WINDOW_DAYS))
            .cloned()
            .collect::<Vec<_>>();
        upcoming.sort_by_key(|s| s.next_due);
        Ok(upcoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rentboard_core::{Amenity, RoomStatus, ServiceFrequency, ServiceType};
    use tempfile::tempdir;

    fn form(name: &str) -> RoomFormData {
        RoomFormData {
            name: name.into(),
            amenities: vec![Amenity::Parking],
            price: 1900.0,
            location: "Daly City, CA".into(),
            ..RoomFormData::default()
        }
    }

    fn schedule_input(room_id: i64) -> CreateServiceScheduleInput {
        CreateServiceScheduleInput {
            service_type: ServiceType::Maintenance,
            frequency: ServiceFrequency::Quarterly,
            room_id,
            room_name: format!("Room {room_id}"),
            description: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn loads_bare_room_dump_from_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("rooms.json");
        std::fs::write(
            &path,
            r#"[{"id":"3","name":"Bay Studio","price":1600,"location":"San Francisco, CA","status":"ACTIVE"}]"#,
        )
        .unwrap();

        let backend = FixtureBackend::from_path(&path).await.unwrap();
        let rooms = backend.list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].status, RoomStatus::Active);
        assert_eq!(rooms[0].bed, 1);
    }

    #[tokio::test]
    async fn missing_or_malformed_fixture_reports_path() {
        let dir = tempdir().expect("tempdir");
        let err = FixtureBackend::from_path(dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, FixtureError::Read { .. }));
        assert!(err.to_string().contains("nope.json"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"rooms": 3}"#).unwrap();
        let err = FixtureBackend::from_path(&bad).await.unwrap_err();
        assert!(matches!(err, FixtureError::Parse { .. }));
    }

    #[tokio::test]
    async fn loads_full_bundle_with_schedules() {
        let file: FixtureFile = serde_json::from_str(
            r#"{
                "rooms": [],
                "serviceSchedules": [{
                    "id": 4, "type": "CLEANING", "frequency": "MONTHLY",
                    "roomId": 1, "roomName": "Loft", "isActive": true,
                    "lastPerformed": null, "nextDue": "2020-01-01T00:00:00Z",
                    "createdAt": "2019-12-01T00:00:00Z", "updatedAt": "2019-12-01T00:00:00Z"
                }]
            }"#,
        )
        .unwrap();
        let backend = FixtureBackend::new(file);
        assert!(backend.list_rooms().await.unwrap().is_empty());
        let upcoming = backend.upcoming_services().await.unwrap();
        assert_eq!(upcoming.len(), 1);
        let created = backend.create_service_schedule(&schedule_input(1)).await.unwrap();
        assert_eq!(created.id, 5);
    }

    #[tokio::test]
    async fn room_crud_assigns_ids_and_keeps_order() {
        let backend = FixtureBackend::default();
        let a = backend.create_room(&form("Alpha")).await.unwrap();
        let b = backend.create_room(&form("Beta")).await.unwrap();
        assert_eq!((a.id.as_str(), b.id.as_str()), ("1", "2"));
        assert_eq!(a.amenities, vec!["Parking".to_string()]);

        let updated = backend.update_room("1", &form("Alpha Prime")).await.unwrap();
        assert_eq!(updated.name, "Alpha Prime");

        backend.delete_room("2").await.unwrap();
        assert!(backend.delete_room("2").await.unwrap_err().is_not_found());
        assert!(backend
            .update_room("9", &form("Ghost"))
            .await
            .unwrap_err()
            .is_not_found());

        let names = backend
            .list_rooms()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Alpha Prime"]);
    }

    #[tokio::test]
    async fn new_schedules_are_due_until_completed() {
        let backend = FixtureBackend::default();
        let created = backend.create_service_schedule(&schedule_input(1)).await.unwrap();
        assert_eq!(backend.upcoming_services().await.unwrap().len(), 1);

        let done = backend.complete_service_schedule(created.id).await.unwrap();
        assert!(done.last_performed.is_some());
        assert!(done.next_due > Utc::now() + Duration::days(UPCOMING_WINDOW_DAYS));
        assert!(backend.upcoming_services().await.unwrap().is_empty());

        assert!(backend
            .complete_service_schedule(99)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn service_configs_default_ids() {
        let backend = FixtureBackend::default();
        let config = backend
            .create_service_config(&CreateServiceConfigInput {
                service_type: ServiceType::Cleaning,
                frequency: ServiceFrequency::Monthly,
                description: "Common areas".into(),
                is_active: true,
            })
            .await
            .unwrap();
        assert_eq!(config.id, 1);
        assert_eq!(backend.list_service_configs().await.unwrap().len(), 1);
    }
}
