use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::event::{Event, EventPatch, NewEvent};
use crate::models::registration::{NewRegistration, Registration, PAYMENT_PAID};
use crate::models::student::{NewStudent, Student};
use crate::store::{RegistrationInsert, Store, StoreError};

#[derive(Default)]
struct Inner {
    next_event_id: i32,
    events: BTreeMap<i32, Event>,
    students: BTreeMap<String, Student>,
    registrations: Vec<Registration>,
}

/// In-memory store used by the test suite and local demos. The single
/// mutex is the transaction boundary: every operation runs under one lock,
/// so the capacity check and insert cannot interleave.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert_event(&self, new: NewEvent) -> Result<Event, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_event_id += 1;
        let now = Utc::now();
        let event = Event {
            id: inner.next_event_id,
            title: new.title,
            description: new.description,
            date: new.date,
            time: new.time,
            duration: new.duration,
            location: new.location,
            category: new.category,
            capacity: new.capacity,
            price: new.price,
            image: new.image,
            organizer: new.organizer,
            status: new.status,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        };
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn event(&self, id: i32) -> Result<Option<Event>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.get(&id).cloned())
    }

    async fn events(&self) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.values().cloned().collect())
    }

    async fn events_by_status(&self, status: &str) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .events
            .values()
            .filter(|e| e.status == status)
            .cloned()
            .collect())
    }

    async fn update_event(&self, id: i32, patch: EventPatch) -> Result<Option<Event>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(event) = inner.events.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(description) = patch.description {
            event.description = description;
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if let Some(time) = patch.time {
            event.time = time;
        }
        if let Some(duration) = patch.duration {
            event.duration = duration;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if let Some(category) = patch.category {
            event.category = category;
        }
        if let Some(capacity) = patch.capacity {
            event.capacity = capacity;
        }
        if let Some(price) = patch.price {
            event.price = price;
        }
        if let Some(image) = patch.image {
            event.image = image;
        }
        if let Some(organizer) = patch.organizer {
            event.organizer = organizer;
        }
        if let Some(status) = patch.status {
            event.status = status;
        }
        if let Some(tags) = patch.tags {
            event.tags = tags;
        }
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: i32) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.events.remove(&id).is_some();
        if removed {
            inner.registrations.retain(|r| r.event_id != id);
        }
        Ok(removed)
    }

    async fn event_categories(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut categories: Vec<String> =
            inner.events.values().map(|e| e.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn count_events(&self) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.len() as i64)
    }

    async fn count_events_after(&self, date: NaiveDate) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.values().filter(|e| e.date > date).count() as i64)
    }

    async fn upcoming_events(
        &self,
        after: NaiveDate,
        until: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.date > after && e.date <= until)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.date);
        events.truncate(limit as usize);
        Ok(events)
    }

    async fn insert_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let collision = inner
            .students
            .values()
            .any(|s| s.usn == new.usn || s.email == new.email);
        if collision || inner.students.contains_key(&new.id) {
            return Err(StoreError::Duplicate(
                "USN or email already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let student = Student {
            id: new.id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            usn: new.usn,
            semester: new.semester,
            branch: new.branch,
            password_hash: new.password_hash,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        inner.students.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    async fn student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.students.get(id).cloned())
    }

    async fn student_by_usn(&self, usn: &str) -> Result<Option<Student>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.students.values().find(|s| s.usn == usn).cloned())
    }

    async fn student_by_usn_or_email(
        &self,
        usn: &str,
        email: &str,
    ) -> Result<Option<Student>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .students
            .values()
            .find(|s| s.usn == usn || s.email == email)
            .cloned())
    }

    async fn students(&self) -> Result<Vec<Student>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.students.values().cloned().collect())
    }

    async fn delete_student(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.students.remove(id).is_some();
        if removed {
            inner.registrations.retain(|r| r.student_id != id);
        }
        Ok(removed)
    }

    async fn create_registration(
        &self,
        new: NewRegistration,
        capacity: i32,
    ) -> Result<RegistrationInsert, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner
            .registrations
            .iter()
            .any(|r| r.event_id == new.event_id && r.student_id == new.student_id);
        if duplicate {
            return Ok(RegistrationInsert::AlreadyRegistered);
        }
        let taken = inner
            .registrations
            .iter()
            .filter(|r| r.event_id == new.event_id)
            .count() as i64;
        if taken >= i64::from(capacity) {
            return Ok(RegistrationInsert::EventFull);
        }
        let now = Utc::now();
        let registration = Registration {
            id: new.id,
            event_id: new.event_id,
            student_id: new.student_id,
            amount_paid: new.amount_paid,
            payment_status: new.payment_status,
            payment_method: new.payment_method,
            transaction_id: new.transaction_id,
            special_requirements: new.special_requirements,
            registered_at: now,
            updated_at: now,
        };
        inner.registrations.push(registration.clone());
        Ok(RegistrationInsert::Created(registration))
    }

    async fn registration(&self, id: &str) -> Result<Option<Registration>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.registrations.iter().find(|r| r.id == id).cloned())
    }

    async fn registrations(&self) -> Result<Vec<Registration>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.registrations.clone())
    }

    async fn registrations_for_event(
        &self,
        event_id: i32,
    ) -> Result<Vec<Registration>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn registrations_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Registration>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .registrations
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn registration_for(
        &self,
        event_id: i32,
        student_id: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .registrations
            .iter()
            .find(|r| r.event_id == event_id && r.student_id == student_id)
            .cloned())
    }

    async fn count_registrations(&self) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.registrations.len() as i64)
    }

    async fn count_registrations_for_event(&self, event_id: i32) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn count_registrations_for_student(&self, student_id: &str) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .registrations
            .iter()
            .filter(|r| r.student_id == student_id)
            .count() as i64)
    }

    async fn delete_registration(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.registrations.len();
        inner.registrations.retain(|r| r.id != id);
        Ok(inner.registrations.len() < before)
    }

    async fn paid_revenue(&self) -> Result<Decimal, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .registrations
            .iter()
            .filter(|r| r.payment_status == PAYMENT_PAID)
            .map(|r| r.amount_paid)
            .sum())
    }

    async fn paid_revenue_for_event(&self, event_id: i32) -> Result<Decimal, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id && r.payment_status == PAYMENT_PAID)
            .map(|r| r.amount_paid)
            .sum())
    }

    async fn recent_registrations(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Registration>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut registrations: Vec<Registration> = inner
            .registrations
            .iter()
            .filter(|r| r.registered_at > since)
            .cloned()
            .collect();
        registrations.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        registrations.truncate(limit as usize);
        Ok(registrations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::STATUS_ACTIVE;

    fn sample_event(capacity: i32) -> NewEvent {
        NewEvent {
            title: "Tech Innovation Summit".to_string(),
            description: "A day of talks and workshops.".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 3, 15).unwrap(),
            time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration: 8,
            location: "Main Auditorium".to_string(),
            category: "Technology".to_string(),
            capacity,
            price: Decimal::ZERO,
            image: String::new(),
            organizer: "Tech Club".to_string(),
            status: STATUS_ACTIVE.to_string(),
            tags: vec!["Technology".to_string()],
        }
    }

    fn sample_student(usn: &str, email: &str) -> NewStudent {
        NewStudent {
            id: usn.to_string(),
            name: "Asha Rao".to_string(),
            email: email.to_string(),
            phone: String::new(),
            usn: usn.to_string(),
            semester: 4,
            branch: "Computer Science".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
        }
    }

    fn sample_registration(id: &str, event_id: i32, student_id: &str) -> NewRegistration {
        NewRegistration {
            id: id.to_string(),
            event_id,
            student_id: student_id.to_string(),
            amount_paid: Decimal::ZERO,
            payment_status: crate::models::registration::PAYMENT_PAID.to_string(),
            payment_method: "card".to_string(),
            transaction_id: None,
            special_requirements: String::new(),
        }
    }

    #[tokio::test]
    async fn event_ids_are_sequential() {
        let store = MemStore::new();
        let first = store.insert_event(sample_event(10)).await.unwrap();
        let second = store.insert_event(sample_event(10)).await.unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn duplicate_usn_is_rejected() {
        let store = MemStore::new();
        store
            .insert_student(sample_student("1RV22CS001", "asha@example.edu"))
            .await
            .unwrap();
        let err = store
            .insert_student(sample_student("1RV22CS001", "other@example.edu"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn deleting_event_cascades_registrations() {
        let store = MemStore::new();
        let event = store.insert_event(sample_event(10)).await.unwrap();
        store
            .insert_student(sample_student("1RV22CS001", "asha@example.edu"))
            .await
            .unwrap();
        store
            .create_registration(sample_registration("r1", event.id, "1RV22CS001"), 10)
            .await
            .unwrap();

        assert!(store.delete_event(event.id).await.unwrap());
        assert_eq!(store.count_registrations().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_student_cascades_registrations() {
        let store = MemStore::new();
        let event = store.insert_event(sample_event(10)).await.unwrap();
        store
            .insert_student(sample_student("1RV22CS001", "asha@example.edu"))
            .await
            .unwrap();
        store
            .create_registration(sample_registration("r1", event.id, "1RV22CS001"), 10)
            .await
            .unwrap();

        assert!(store.delete_student("1RV22CS001").await.unwrap());
        assert_eq!(
            store
                .count_registrations_for_event(event.id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn conditional_insert_enforces_capacity() {
        let store = MemStore::new();
        let event = store.insert_event(sample_event(1)).await.unwrap();
        store
            .insert_student(sample_student("1RV22CS001", "asha@example.edu"))
            .await
            .unwrap();
        store
            .insert_student(sample_student("1RV22CS002", "ravi@example.edu"))
            .await
            .unwrap();

        let first = store
            .create_registration(sample_registration("r1", event.id, "1RV22CS001"), 1)
            .await
            .unwrap();
        assert!(matches!(first, RegistrationInsert::Created(_)));

        let second = store
            .create_registration(sample_registration("r2", event.id, "1RV22CS002"), 1)
            .await
            .unwrap();
        assert!(matches!(second, RegistrationInsert::EventFull));
    }
}
