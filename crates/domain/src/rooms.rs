//! Rooms and their occupancy.

use std::sync::Arc;

use isenior_core::model::{Room, RoomInput, RoomView};
use isenior_core::store::RoomStore;
use isenior_core::{Error, Result, Store};
use tracing::info;

pub struct RoomService {
    store: Arc<dyn Store>,
}

impl RoomService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<RoomView>> {
        let rooms = self.store.list_rooms(None).await?;
        let mut views = Vec::with_capacity(rooms.len());
        for room in rooms {
            views.push(self.view(room).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, room_number: i64) -> Result<RoomView> {
        let room = self
            .store
            .get_room(room_number)
            .await?
            .ok_or_else(|| Error::not_found("Room", room_number))?;
        self.view(room).await
    }

    pub async fn create(&self, input: RoomInput) -> Result<RoomView> {
        if input.room_number <= 0 {
            return Err(Error::validation("room_number must be positive"));
        }
        check_capacity(input.capacity)?;
        if self.store.get_room(input.room_number).await?.is_some() {
            return Err(Error::conflict(format!(
                "room {} already exists",
                input.room_number
            )));
        }

        let room = self.store.insert_room(&input).await?;
        info!(room = room.room_number, capacity = room.capacity, "Room created");
        Ok(RoomView {
            room_number: room.room_number,
            capacity: room.capacity,
            occupancy: 0,
        })
    }

    /// Capacity may not drop below the number of residents already assigned.
    pub async fn update_capacity(&self, room_number: i64, capacity: i64) -> Result<RoomView> {
        check_capacity(capacity)?;
        if self.store.get_room(room_number).await?.is_none() {
            return Err(Error::not_found("Room", room_number));
        }
        let occupancy = self.store.count_room_occupants(room_number, None).await?;
        if capacity < occupancy {
            return Err(Error::conflict(format!(
                "room {room_number} has {occupancy} residents, capacity cannot be {capacity}"
            )));
        }

        let room = self
            .store
            .update_room_capacity(room_number, capacity)
            .await?
            .ok_or_else(|| Error::not_found("Room", room_number))?;
        info!(room = room_number, capacity, "Room capacity changed");
        Ok(RoomView {
            room_number: room.room_number,
            capacity: room.capacity,
            occupancy,
        })
    }

    pub async fn delete(&self, room_number: i64) -> Result<()> {
        if self.store.get_room(room_number).await?.is_none() {
            return Err(Error::not_found("Room", room_number));
        }
        let occupancy = self.store.count_room_occupants(room_number, None).await?;
        if occupancy > 0 {
            return Err(Error::conflict(format!(
                "room {room_number} is occupied by {occupancy} resident(s)"
            )));
        }
        if !self.store.delete_room(room_number).await? {
            return Err(Error::not_found("Room", room_number));
        }
        info!(room = room_number, "Room deleted");
        Ok(())
    }

    async fn view(&self, room: Room) -> Result<RoomView> {
        let occupancy = self
            .store
            .count_room_occupants(room.room_number, None)
            .await?;
        Ok(RoomView {
            room_number: room.room_number,
            capacity: room.capacity,
            occupancy,
        })
    }
}

fn check_capacity(capacity: i64) -> Result<()> {
    if capacity <= 0 {
        return Err(Error::validation("capacity must be a positive integer"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use isenior_core::model::ResidentInput;
    use isenior_core::store::ResidentStore;

    fn room(room_number: i64, capacity: i64) -> RoomInput {
        RoomInput {
            room_number,
            capacity,
        }
    }

    #[tokio::test]
    async fn create_list_and_duplicate() {
        let service = RoomService::new(testing::store().await);
        service.create(room(102, 2)).await.unwrap();
        service.create(room(101, 1)).await.unwrap();

        let rooms = service.list().await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_number, 101);
        assert_eq!(rooms[0].occupancy, 0);

        assert!(matches!(
            service.create(room(101, 3)).await.unwrap_err(),
            Error::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn non_positive_capacity_rejected() {
        let service = RoomService::new(testing::store().await);
        assert!(matches!(
            service.create(room(101, 0)).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn occupancy_guards_capacity_and_delete() {
        let store = testing::store().await;
        let service = RoomService::new(store.clone());
        service.create(room(101, 2)).await.unwrap();
        for (last, first) in [("Dupont", "Marie"), ("Martin", "Pierre")] {
            store
                .insert_resident(&ResidentInput {
                    room_number: Some(101),
                    ..testing::resident(last, first)
                })
                .await
                .unwrap();
        }

        assert_eq!(service.get(101).await.unwrap().occupancy, 2);
        assert!(matches!(
            service.update_capacity(101, 1).await.unwrap_err(),
            Error::Conflict(_)
        ));
        assert_eq!(service.update_capacity(101, 3).await.unwrap().capacity, 3);
        assert!(matches!(
            service.delete(101).await.unwrap_err(),
            Error::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn missing_room_is_not_found() {
        let service = RoomService::new(testing::store().await);
        assert!(matches!(
            service.get(303).await.unwrap_err(),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            service.delete(303).await.unwrap_err(),
            Error::NotFound { .. }
        ));
    }
}
