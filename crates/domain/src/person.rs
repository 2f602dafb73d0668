// Person aggregate: the person record plus the phone numbers it owns.

use crate::paging::{PagedResult, PageRequest};
use crate::shared_kernel::{DomainError, Gender, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

/// A phone number owned by exactly one person.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPhoneNumber {
    pub id: i32,
    pub person_id: i32,
    pub phone_number: String,
    pub phone_number_type_id: i32,
    pub is_deleted: bool,
}

impl PersonPhoneNumber {
    pub fn create(phone_number: &str, phone_number_type_id: i32) -> Self {
        Self {
            id: 0,
            person_id: 0,
            phone_number: phone_number.trim().to_string(),
            phone_number_type_id,
            is_deleted: false,
        }
    }

    pub fn update(&mut self, phone_number_type_id: i32, phone_number: &str) {
        self.phone_number_type_id = phone_number_type_id;
        self.phone_number = phone_number.trim().to_string();
    }

    pub fn delete(&mut self) {
        self.is_deleted = true;
    }
}

/// A person record. The empty string in `photo` means "no photo".
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub personal_number: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub photo: String,
    pub city_id: i32,
    pub is_deleted: bool,
    pub phone_numbers: Vec<PersonPhoneNumber>,
}

impl Person {
    pub fn create(
        name: &str,
        last_name: &str,
        personal_number: &str,
        birth_date: NaiveDate,
        gender: Gender,
        city_id: i32,
    ) -> Self {
        Self {
            id: 0,
            name: name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            personal_number: personal_number.trim().to_string(),
            birth_date,
            gender,
            photo: String::new(),
            city_id,
            is_deleted: false,
            phone_numbers: Vec::new(),
        }
    }

    pub fn update(
        &mut self,
        name: &str,
        last_name: &str,
        personal_number: &str,
        birth_date: NaiveDate,
        gender: Gender,
        city_id: i32,
    ) {
        self.name = name.trim().to_string();
        self.last_name = last_name.trim().to_string();
        self.personal_number = personal_number.trim().to_string();
        self.birth_date = birth_date;
        self.gender = gender;
        self.city_id = city_id;
    }

    pub fn update_photo_url(&mut self, photo_url: &str) {
        self.photo = photo_url.to_string();
    }

    pub fn delete_photo(&mut self) {
        self.photo.clear();
    }

    pub fn delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn has_photo(&self) -> bool {
        !self.photo.is_empty()
    }

    pub fn add_phone_number(&mut self, mut phone_number: PersonPhoneNumber) {
        phone_number.person_id = self.id;
        self.phone_numbers.push(phone_number);
    }

    /// Updates one of the loaded phone numbers and returns the updated row
    /// for persistence.
    pub fn update_number(
        &mut self,
        phone_number_id: i32,
        phone_number_type_id: i32,
        number: &str,
    ) -> Result<PersonPhoneNumber> {
        let phone = self
            .phone_numbers
            .iter_mut()
            .find(|p| p.id == phone_number_id && !p.is_deleted)
            .ok_or(DomainError::not_found("phone number", phone_number_id))?;

        phone.update(phone_number_type_id, number);
        Ok(phone.clone())
    }

    /// Soft-deletes one of the loaded phone numbers and returns the marked
    /// row for persistence.
    pub fn delete_number(&mut self, phone_number_id: i32) -> Result<PersonPhoneNumber> {
        let phone = self
            .phone_numbers
            .iter_mut()
            .find(|p| p.id == phone_number_id && !p.is_deleted)
            .ok_or(DomainError::not_found("phone number", phone_number_id))?;

        phone.delete();
        Ok(phone.clone())
    }
}

/// A phone number joined with its type name, for detail views.
#[derive(Debug, Clone)]
pub struct PhoneNumberDetails {
    pub id: i32,
    pub phone_number: String,
    pub phone_number_type_id: i32,
    pub phone_number_type: String,
}

/// An outgoing relation joined with the related person and type name.
#[derive(Debug, Clone)]
pub struct RelationDetails {
    pub related_person_id: i32,
    pub related_person_name: String,
    pub related_person_last_name: String,
    pub relation_type_id: i32,
    pub relation_type: String,
}

/// A person with its city and joined collections resolved, as served by the
/// detail query.
#[derive(Debug, Clone)]
pub struct PersonDetails {
    pub person: Person,
    pub city_name: String,
    pub phone_numbers: Vec<PhoneNumberDetails>,
    pub relations: Vec<RelationDetails>,
}

/// Optional person filters, combined with AND semantics. Absent fields
/// exclude nothing; an out-of-range gender value never reaches this struct.
#[derive(Debug, Clone, Default)]
pub struct PersonFilter {
    /// Free-text match over name, last name and personal number.
    pub query: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub personal_number: Option<String>,
    pub gender: Option<Gender>,
    /// Exact date-only comparison.
    pub birth_date: Option<NaiveDate>,
    pub city_id: Option<i32>,
}

#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Inserts the person and writes the store-assigned id back into it.
    async fn add(&self, person: &mut Person) -> Result<()>;

    async fn update(&self, person: &Person) -> Result<()>;

    /// Physical delete, for infrastructure and test use only.
    async fn remove(&self, id: i32) -> Result<()>;

    /// Primary-key lookup with the person's active phone numbers loaded.
    async fn get_by_id(&self, id: i32) -> Result<Option<Person>>;

    /// Lookup with city, phone numbers and relations resolved.
    async fn get_details_by_id(&self, id: i32) -> Result<Option<PersonDetails>>;

    async fn exists(&self, id: i32) -> Result<bool>;

    /// Whether an active person carries this personal number.
    async fn personal_number_exists(&self, personal_number: &str) -> Result<bool>;

    async fn list(&self, filter: &PersonFilter, page: PageRequest) -> Result<PagedResult<Person>>;

    /// Inserts a phone number row for the person and writes the assigned id
    /// back.
    async fn add_phone(&self, person_id: i32, phone: &mut PersonPhoneNumber) -> Result<()>;

    async fn update_phone(&self, phone: &PersonPhoneNumber) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 4, 12).unwrap()
    }

    fn sample_person() -> Person {
        Person::create(" Nino ", " Beridze ", " 01001054321 ", birth_date(), Gender::Female, 5)
    }

    #[test]
    fn create_trims_and_starts_without_photo() {
        let person = sample_person();
        assert_eq!(person.name, "Nino");
        assert_eq!(person.last_name, "Beridze");
        assert_eq!(person.personal_number, "01001054321");
        assert!(!person.has_photo());
        assert!(person.phone_numbers.is_empty());
    }

    #[test]
    fn photo_round_trip() {
        let mut person = sample_person();
        person.update_photo_url("photos/nino.jpg");
        assert!(person.has_photo());
        person.delete_photo();
        assert!(!person.has_photo());
    }

    #[test]
    fn update_number_on_missing_phone_is_not_found() {
        let mut person = sample_person();
        let err = person.update_number(42, 1, "555123").unwrap_err();
        assert!(matches!(err, DomainError::NotFound { id: 42, .. }));
    }

    #[test]
    fn delete_number_marks_the_owned_row() {
        let mut person = sample_person();
        let mut phone = PersonPhoneNumber::create("555123", 1);
        phone.id = 9;
        person.add_phone_number(phone);

        let deleted = person.delete_number(9).unwrap();
        assert!(deleted.is_deleted);
        // a second delete no longer sees the row
        assert!(person.delete_number(9).is_err());
    }
}
