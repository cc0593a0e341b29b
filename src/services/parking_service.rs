//! ParkingService — region, spot, and student storage plus the one piece of
//! real business logic: keeping each spot's `occupied` flag in sync with the
//! student that holds it. Metadata lives in SQLite; the service itself is
//! stateless between calls.

use crate::models::{
    region::{Region, RegionBody},
    spot::{Spot, SpotBody},
    student::{Student, StudentBody},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ParkingError {
    #[error("region `{0}` not found")]
    RegionNotFound(i64),
    #[error("spot `{0}` not found")]
    SpotNotFound(i64),
    #[error("student `{0}` not found")]
    StudentNotFound(i64),
    #[error("student `{0}` has no spot assigned")]
    NoSpotAssigned(i64),
    #[error("there was a problem saving the record")]
    SaveFailed,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ParkingResult<T> = Result<T, ParkingError>;

/// ParkingService provides the CRUD surface for regions, spots, and
/// students, and owns the occupancy bookkeeping:
/// - Changing a student's assignment releases the old spot and claims the
///   new one.
/// - Deleting a student releases whatever spot they held.
///
/// Writes to a spot that no longer exists are skipped, never failed: a
/// dangling `spot_id` on a student is tolerated.
#[derive(Clone)]
pub struct ParkingService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl ParkingService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    // --- regions ---

    pub async fn list_regions(&self) -> ParkingResult<Vec<Region>> {
        Ok(
            sqlx::query_as::<_, Region>("SELECT id, name FROM regions ORDER BY id")
                .fetch_all(&*self.db)
                .await?,
        )
    }

    async fn fetch_region(&self, id: i64) -> ParkingResult<Region> {
        sqlx::query_as::<_, Region>("SELECT id, name FROM regions WHERE id = ?")
            .bind(id)
            .fetch_one(&*self.db)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => ParkingError::RegionNotFound(id),
                other => ParkingError::Sqlx(other),
            })
    }

    pub async fn create_region(&self, body: &RegionBody) -> ParkingResult<Region> {
        Ok(sqlx::query_as::<_, Region>(
            "INSERT INTO regions (name) VALUES (?) RETURNING id, name",
        )
        .bind(&body.name)
        .fetch_one(&*self.db)
        .await?)
    }

    pub async fn update_region(&self, id: i64, body: &RegionBody) -> ParkingResult<()> {
        self.fetch_region(id).await?;

        let result = sqlx::query("UPDATE regions SET name = ? WHERE id = ?")
            .bind(&body.name)
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ParkingError::SaveFailed);
        }
        Ok(())
    }

    pub async fn delete_region(&self, id: i64) -> ParkingResult<()> {
        let result = sqlx::query("DELETE FROM regions WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ParkingError::RegionNotFound(id));
        }
        Ok(())
    }

    // --- spots ---

    pub async fn list_spots(&self) -> ParkingResult<Vec<Spot>> {
        Ok(sqlx::query_as::<_, Spot>(
            "SELECT id, region, name, type, latitude, longitude, address, occupied
             FROM spots ORDER BY id",
        )
        .fetch_all(&*self.db)
        .await?)
    }

    /// Fetch a spot by id. Returns SpotNotFound if missing.
    pub async fn get_spot(&self, id: i64) -> ParkingResult<Spot> {
        sqlx::query_as::<_, Spot>(
            "SELECT id, region, name, type, latitude, longitude, address, occupied
             FROM spots WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ParkingError::SpotNotFound(id),
            other => ParkingError::Sqlx(other),
        })
    }

    /// All spots whose region name matches exactly. May be empty.
    pub async fn spots_in_region(&self, region: &str) -> ParkingResult<Vec<Spot>> {
        Ok(sqlx::query_as::<_, Spot>(
            "SELECT id, region, name, type, latitude, longitude, address, occupied
             FROM spots WHERE region = ? ORDER BY id",
        )
        .bind(region)
        .fetch_all(&*self.db)
        .await?)
    }

    /// Insert a spot. New spots always start unoccupied.
    pub async fn create_spot(&self, body: &SpotBody) -> ParkingResult<Spot> {
        Ok(sqlx::query_as::<_, Spot>(
            "INSERT INTO spots (region, name, type, latitude, longitude, address, occupied)
             VALUES (?, ?, ?, ?, ?, ?, 0)
             RETURNING id, region, name, type, latitude, longitude, address, occupied",
        )
        .bind(&body.region)
        .bind(&body.name)
        .bind(&body.kind)
        .bind(body.latitude)
        .bind(body.longitude)
        .bind(&body.address)
        .fetch_one(&*self.db)
        .await?)
    }

    /// Replace a spot's user-editable fields. `occupied` is preserved.
    pub async fn update_spot(&self, id: i64, body: &SpotBody) -> ParkingResult<()> {
        self.get_spot(id).await?;

        let result = sqlx::query(
            "UPDATE spots
             SET region = ?, name = ?, type = ?, latitude = ?, longitude = ?, address = ?
             WHERE id = ?",
        )
        .bind(&body.region)
        .bind(&body.name)
        .bind(&body.kind)
        .bind(body.latitude)
        .bind(body.longitude)
        .bind(&body.address)
        .bind(id)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ParkingError::SaveFailed);
        }
        Ok(())
    }

    pub async fn delete_spot(&self, id: i64) -> ParkingResult<()> {
        let result = sqlx::query("DELETE FROM spots WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ParkingError::SpotNotFound(id));
        }
        Ok(())
    }

    // --- students ---

    pub async fn list_students(&self) -> ParkingResult<Vec<Student>> {
        Ok(sqlx::query_as::<_, Student>(
            "SELECT id, name, ra, spot_id, email FROM students ORDER BY id",
        )
        .fetch_all(&*self.db)
        .await?)
    }

    pub async fn get_student(&self, id: i64) -> ParkingResult<Student> {
        sqlx::query_as::<_, Student>(
            "SELECT id, name, ra, spot_id, email FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ParkingError::StudentNotFound(id),
            other => ParkingError::Sqlx(other),
        })
    }

    /// The spot currently held by a student. NoSpotAssigned when the
    /// student exists but holds nothing.
    pub async fn student_spot(&self, student_id: i64) -> ParkingResult<Spot> {
        let student = self.get_student(student_id).await?;
        let spot_id = student
            .spot_id
            .ok_or(ParkingError::NoSpotAssigned(student_id))?;
        self.get_spot(spot_id).await
    }

    /// Insert a student. An initial assignment counts as an assignment
    /// change from nothing, so the occupancy flag is brought along.
    pub async fn create_student(&self, body: &StudentBody) -> ParkingResult<Student> {
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, ra, spot_id, email)
             VALUES (?, ?, ?, ?)
             RETURNING id, name, ra, spot_id, email",
        )
        .bind(&body.name)
        .bind(&body.ra)
        .bind(body.spot_id)
        .bind(&body.email)
        .fetch_one(&*self.db)
        .await?;

        self.apply_assignment_change(None, student.spot_id).await?;
        Ok(student)
    }

    /// Replace a student's fields, keeping spot occupancy consistent with
    /// the assignment change.
    pub async fn update_student(&self, id: i64, body: &StudentBody) -> ParkingResult<()> {
        let current = self.get_student(id).await?;

        self.apply_assignment_change(current.spot_id, body.spot_id)
            .await?;

        let result = sqlx::query(
            "UPDATE students SET name = ?, ra = ?, spot_id = ?, email = ? WHERE id = ?",
        )
        .bind(&body.name)
        .bind(&body.ra)
        .bind(body.spot_id)
        .bind(&body.email)
        .bind(id)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ParkingError::SaveFailed);
        }
        Ok(())
    }

    /// Delete a student, releasing whatever spot they held.
    pub async fn delete_student(&self, id: i64) -> ParkingResult<()> {
        let student = self.get_student(id).await?;

        self.release_on_delete(student.spot_id).await?;

        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ParkingError::SaveFailed);
        }
        Ok(())
    }

    // --- assignment consistency ---

    /// Reconcile spot occupancy after a student's assignment moves from
    /// `previous` to `next`.
    ///
    /// Equal ids are a no-op, including both-None. Otherwise the previous
    /// spot (if any) is released and the next spot (if any) is claimed. Ids
    /// that resolve to no spot are skipped silently. At most two writes.
    pub async fn apply_assignment_change(
        &self,
        previous: Option<i64>,
        next: Option<i64>,
    ) -> ParkingResult<()> {
        if previous == next {
            return Ok(());
        }

        if let Some(spot_id) = previous {
            self.set_spot_occupied(spot_id, false).await?;
        }
        if let Some(spot_id) = next {
            self.set_spot_occupied(spot_id, true).await?;
        }
        Ok(())
    }

    /// Release the spot referenced by a student being deleted, if any.
    pub async fn release_on_delete(&self, spot_id: Option<i64>) -> ParkingResult<()> {
        if let Some(spot_id) = spot_id {
            self.set_spot_occupied(spot_id, false).await?;
        }
        Ok(())
    }

    /// Flip a spot's occupancy flag. A missing spot is not an error here;
    /// the update is simply skipped.
    async fn set_spot_occupied(&self, id: i64, occupied: bool) -> ParkingResult<()> {
        let result = sqlx::query("UPDATE spots SET occupied = ? WHERE id = ?")
            .bind(occupied)
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            debug!("spot {} does not exist, skipping occupancy update", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_pool;

    async fn service() -> ParkingService {
        ParkingService::new(test_pool().await)
    }

    fn region(name: &str) -> RegionBody {
        RegionBody { name: name.into() }
    }

    fn spot(region: &str, name: &str) -> SpotBody {
        SpotBody {
            region: region.into(),
            name: name.into(),
            kind: "car".into(),
            latitude: 0.0,
            longitude: 0.0,
            address: "x".into(),
        }
    }

    fn student(email: &str, spot_id: Option<i64>) -> StudentBody {
        StudentBody {
            name: "Bob".into(),
            ra: "12345".into(),
            spot_id,
            email: email.into(),
            password: None,
            confirm_password: None,
        }
    }

    #[tokio::test]
    async fn region_crud_roundtrip() {
        let svc = service().await;

        let created = svc.create_region(&region("North")).await.unwrap();
        assert_eq!(created.name, "North");

        svc.update_region(created.id, &region("South")).await.unwrap();
        let listed = svc.list_regions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "South");

        svc.delete_region(created.id).await.unwrap();
        assert!(svc.list_regions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_region_is_not_found() {
        let svc = service().await;
        let err = svc.update_region(42, &region("X")).await.unwrap_err();
        assert!(matches!(err, ParkingError::RegionNotFound(42)));
        let err = svc.delete_region(42).await.unwrap_err();
        assert!(matches!(err, ParkingError::RegionNotFound(42)));
    }

    #[tokio::test]
    async fn new_spots_start_unoccupied() {
        let svc = service().await;
        let created = svc.create_spot(&spot("North", "A1")).await.unwrap();
        assert!(!created.occupied);
        assert_eq!(created.kind, "car");
    }

    #[tokio::test]
    async fn update_spot_preserves_occupancy() {
        let svc = service().await;
        let created = svc.create_spot(&spot("North", "A1")).await.unwrap();
        svc.set_spot_occupied(created.id, true).await.unwrap();

        svc.update_spot(created.id, &spot("South", "B2")).await.unwrap();

        let updated = svc.get_spot(created.id).await.unwrap();
        assert_eq!(updated.region, "South");
        assert_eq!(updated.name, "B2");
        assert!(updated.occupied);
    }

    #[tokio::test]
    async fn spots_in_region_filters_by_name() {
        let svc = service().await;
        svc.create_spot(&spot("North", "A1")).await.unwrap();
        svc.create_spot(&spot("North", "A2")).await.unwrap();
        svc.create_spot(&spot("South", "B1")).await.unwrap();

        let north = svc.spots_in_region("North").await.unwrap();
        assert_eq!(north.len(), 2);
        assert!(svc.spots_in_region("West").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn creating_a_student_with_a_spot_claims_it() {
        let svc = service().await;
        let s = svc.create_spot(&spot("North", "A1")).await.unwrap();

        svc.create_student(&student("b@x.com", Some(s.id))).await.unwrap();

        assert!(svc.get_spot(s.id).await.unwrap().occupied);
    }

    #[tokio::test]
    async fn reassignment_flips_both_spots() {
        let svc = service().await;
        let a = svc.create_spot(&spot("North", "A1")).await.unwrap();
        let b = svc.create_spot(&spot("North", "A2")).await.unwrap();
        let st = svc.create_student(&student("b@x.com", Some(a.id))).await.unwrap();

        svc.update_student(st.id, &student("b@x.com", Some(b.id)))
            .await
            .unwrap();

        assert!(!svc.get_spot(a.id).await.unwrap().occupied);
        assert!(svc.get_spot(b.id).await.unwrap().occupied);
    }

    #[tokio::test]
    async fn unchanged_assignment_writes_nothing() {
        let svc = service().await;
        let s = svc.create_spot(&spot("North", "A1")).await.unwrap();
        let st = svc.create_student(&student("b@x.com", Some(s.id))).await.unwrap();

        // Force the flag out of sync; an x -> x change must not touch it.
        sqlx::query("UPDATE spots SET occupied = 0 WHERE id = ?")
            .bind(s.id)
            .execute(&*svc.db)
            .await
            .unwrap();

        svc.apply_assignment_change(st.spot_id, st.spot_id).await.unwrap();
        assert!(!svc.get_spot(s.id).await.unwrap().occupied);

        svc.apply_assignment_change(None, None).await.unwrap();
        assert!(!svc.get_spot(s.id).await.unwrap().occupied);
    }

    #[tokio::test]
    async fn deleting_a_student_releases_their_spot() {
        let svc = service().await;
        let s = svc.create_spot(&spot("North", "A1")).await.unwrap();
        let st = svc.create_student(&student("b@x.com", Some(s.id))).await.unwrap();
        assert!(svc.get_spot(s.id).await.unwrap().occupied);

        svc.delete_student(st.id).await.unwrap();

        assert!(!svc.get_spot(s.id).await.unwrap().occupied);
        assert!(matches!(
            svc.get_student(st.id).await.unwrap_err(),
            ParkingError::StudentNotFound(_)
        ));
    }

    #[tokio::test]
    async fn deleting_an_unassigned_student_touches_no_spot() {
        let svc = service().await;
        let s = svc.create_spot(&spot("North", "A1")).await.unwrap();
        svc.set_spot_occupied(s.id, true).await.unwrap();
        let st = svc.create_student(&student("b@x.com", None)).await.unwrap();

        svc.delete_student(st.id).await.unwrap();

        // Unrelated spot untouched.
        assert!(svc.get_spot(s.id).await.unwrap().occupied);
    }

    #[tokio::test]
    async fn dangling_spot_ids_are_tolerated() {
        let svc = service().await;
        let real = svc.create_spot(&spot("North", "A1")).await.unwrap();
        let st = svc.create_student(&student("b@x.com", None)).await.unwrap();

        // Assign to a spot that does not exist: no error, nothing flipped.
        svc.update_student(st.id, &student("b@x.com", Some(9999)))
            .await
            .unwrap();
        assert!(!svc.get_spot(real.id).await.unwrap().occupied);

        // Moving off the dangling id onto a real spot still claims it.
        svc.update_student(st.id, &student("b@x.com", Some(real.id)))
            .await
            .unwrap();
        assert!(svc.get_spot(real.id).await.unwrap().occupied);
    }

    #[tokio::test]
    async fn student_spot_resolves_the_assignment() {
        let svc = service().await;
        let s = svc.create_spot(&spot("North", "A1")).await.unwrap();
        let held = svc.create_student(&student("b@x.com", Some(s.id))).await.unwrap();
        let empty = svc.create_student(&student("c@x.com", None)).await.unwrap();

        assert_eq!(svc.student_spot(held.id).await.unwrap().id, s.id);
        assert!(matches!(
            svc.student_spot(empty.id).await.unwrap_err(),
            ParkingError::NoSpotAssigned(_)
        ));
    }

    #[tokio::test]
    async fn assignment_lifecycle_keeps_the_invariant() {
        let svc = service().await;
        svc.create_region(&region("North")).await.unwrap();
        let s = svc.create_spot(&spot("North", "A1")).await.unwrap();
        assert!(!s.occupied);

        let st = svc.create_student(&student("b@x.com", None)).await.unwrap();

        svc.update_student(st.id, &student("b@x.com", Some(s.id)))
            .await
            .unwrap();
        assert!(svc.get_spot(s.id).await.unwrap().occupied);

        svc.delete_student(st.id).await.unwrap();
        assert!(!svc.get_spot(s.id).await.unwrap().occupied);
    }
}
