use crate::persistence::query::{contains_pattern, fetch_page, SqlFilter};
use crate::persistence::session::DbSession;
use async_trait::async_trait;
use person_registry_domain::paging::{PagedResult, PageRequest};
use person_registry_domain::person::{
    Person, PersonDetails, PersonFilter, PersonPhoneNumber, PersonRepository, PhoneNumberDetails,
    RelationDetails,
};
use person_registry_domain::{DomainError, Gender, Result};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use std::sync::Arc;

pub struct PgPersonRepository {
    session: Arc<DbSession>,
}

fn read_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::infrastructure(format!("failed to read person row: {e}"))
}

impl PgPersonRepository {
    pub fn new(session: Arc<DbSession>) -> Self {
        Self { session }
    }

    fn map_row(row: &PgRow) -> Result<Person> {
        let gender_value: i16 = row.try_get("gender").map_err(read_err)?;
        let gender = Gender::from_value(gender_value)
            .ok_or(DomainError::infrastructure("unknown gender value in store"))?;

        Ok(Person {
            id: row.try_get("id").map_err(read_err)?,
            name: row.try_get("name").map_err(read_err)?,
            last_name: row.try_get("last_name").map_err(read_err)?,
            personal_number: row.try_get("personal_number").map_err(read_err)?,
            birth_date: row.try_get("birth_date").map_err(read_err)?,
            gender,
            photo: row.try_get("photo").map_err(read_err)?,
            city_id: row.try_get("city_id").map_err(read_err)?,
            is_deleted: row.try_get("is_deleted").map_err(read_err)?,
            phone_numbers: Vec::new(),
        })
    }

    fn map_phone_row(row: &PgRow) -> Result<PersonPhoneNumber> {
        Ok(PersonPhoneNumber {
            id: row.try_get("id").map_err(read_err)?,
            person_id: row.try_get("person_id").map_err(read_err)?,
            phone_number: row.try_get("phone_number").map_err(read_err)?,
            phone_number_type_id: row.try_get("phone_number_type_id").map_err(read_err)?,
            is_deleted: row.try_get("is_deleted").map_err(read_err)?,
        })
    }

    async fn load_phones(&self, person_id: i32) -> Result<Vec<PersonPhoneNumber>> {
        let rows = self
            .session
            .fetch_all(
                sqlx::query(
                    "SELECT id, person_id, phone_number, phone_number_type_id, is_deleted
                     FROM person_phone_numbers
                     WHERE person_id = $1 AND is_deleted = FALSE
                     ORDER BY id",
                )
                .bind(person_id),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to load phone numbers: {e}"))
            })?;
        rows.iter().map(Self::map_phone_row).collect()
    }
}

impl SqlFilter for PersonFilter {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(query) = &self.query {
            let pattern = contains_pattern(query);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR personal_number ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(name) = &self.name {
            qb.push(" AND name ILIKE ").push_bind(contains_pattern(name));
        }
        if let Some(last_name) = &self.last_name {
            qb.push(" AND last_name ILIKE ")
                .push_bind(contains_pattern(last_name));
        }
        if let Some(personal_number) = &self.personal_number {
            qb.push(" AND personal_number ILIKE ")
                .push_bind(contains_pattern(personal_number));
        }
        if let Some(gender) = self.gender {
            qb.push(" AND gender = ").push_bind(gender.as_value());
        }
        if let Some(birth_date) = self.birth_date {
            qb.push(" AND birth_date = ").push_bind(birth_date);
        }
        if let Some(city_id) = self.city_id {
            qb.push(" AND city_id = ").push_bind(city_id);
        }
    }
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    async fn add(&self, person: &mut Person) -> Result<()> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "INSERT INTO persons
                        (name, last_name, personal_number, birth_date, gender, photo,
                         city_id, is_deleted)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                     RETURNING id",
                )
                .bind(&person.name)
                .bind(&person.last_name)
                .bind(&person.personal_number)
                .bind(person.birth_date)
                .bind(person.gender.as_value())
                .bind(&person.photo)
                .bind(person.city_id)
                .bind(person.is_deleted),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to insert person: {e}")))?;
        person.id = row
            .try_get("id")
            .map_err(|e| DomainError::infrastructure(format!("failed to read person id: {e}")))?;
        Ok(())
    }

    async fn update(&self, person: &Person) -> Result<()> {
        let result = self
            .session
            .execute(
                sqlx::query(
                    "UPDATE persons
                     SET name = $2, last_name = $3, personal_number = $4, birth_date = $5,
                         gender = $6, photo = $7, city_id = $8, is_deleted = $9
                     WHERE id = $1",
                )
                .bind(person.id)
                .bind(&person.name)
                .bind(&person.last_name)
                .bind(&person.personal_number)
                .bind(person.birth_date)
                .bind(person.gender.as_value())
                .bind(&person.photo)
                .bind(person.city_id)
                .bind(person.is_deleted),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to update person: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("person", person.id));
        }
        Ok(())
    }

    async fn remove(&self, id: i32) -> Result<()> {
        self.session
            .execute(
                sqlx::query("DELETE FROM person_phone_numbers WHERE person_id = $1").bind(id),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to delete phone numbers: {e}"))
            })?;
        self.session
            .execute(sqlx::query("DELETE FROM persons WHERE id = $1").bind(id))
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to delete person: {e}")))?;
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Person>> {
        let row = self
            .session
            .fetch_optional(
                sqlx::query(
                    "SELECT id, name, last_name, personal_number, birth_date, gender, photo,
                            city_id, is_deleted
                     FROM persons
                     WHERE id = $1 AND is_deleted = FALSE",
                )
                .bind(id),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to load person: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut person = Self::map_row(&row)?;
        person.phone_numbers = self.load_phones(person.id).await?;
        Ok(Some(person))
    }

    async fn get_details_by_id(&self, id: i32) -> Result<Option<PersonDetails>> {
        let Some(person) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let city_row = self
            .session
            .fetch_optional(
                sqlx::query("SELECT name FROM cities WHERE id = $1").bind(person.city_id),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to load city name: {e}")))?;
        let city_name = city_row
            .map(|row| row.try_get("name").map_err(read_err))
            .transpose()?
            .unwrap_or_default();

        let phone_numbers = self
            .session
            .fetch_all(
                sqlx::query(
                    "SELECT pn.id, pn.phone_number, pn.phone_number_type_id,
                            t.name AS phone_number_type
                     FROM person_phone_numbers pn
                     JOIN phone_number_types t ON t.id = pn.phone_number_type_id
                     WHERE pn.person_id = $1 AND pn.is_deleted = FALSE
                     ORDER BY pn.id",
                )
                .bind(id),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to load phone number details: {e}"))
            })?
            .iter()
            .map(|row| {
                Ok(PhoneNumberDetails {
                    id: row.try_get("id").map_err(read_err)?,
                    phone_number: row.try_get("phone_number").map_err(read_err)?,
                    phone_number_type_id: row
                        .try_get("phone_number_type_id")
                        .map_err(read_err)?,
                    phone_number_type: row.try_get("phone_number_type").map_err(read_err)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let relations = self
            .session
            .fetch_all(
                sqlx::query(
                    "SELECT r.related_person_id, p.name, p.last_name, r.relation_type_id,
                            t.name AS relation_type
                     FROM person_relations r
                     JOIN persons p ON p.id = r.related_person_id
                     JOIN person_relation_types t ON t.id = r.relation_type_id
                     WHERE r.person_id = $1 AND r.is_deleted = FALSE
                     ORDER BY r.id",
                )
                .bind(id),
            )
            .await
            .map_err(|e| DomainError::infrastructure(format!("failed to load relations: {e}")))?
            .iter()
            .map(|row| {
                Ok(RelationDetails {
                    related_person_id: row.try_get("related_person_id").map_err(read_err)?,
                    related_person_name: row.try_get("name").map_err(read_err)?,
                    related_person_last_name: row.try_get("last_name").map_err(read_err)?,
                    relation_type_id: row.try_get("relation_type_id").map_err(read_err)?,
                    relation_type: row.try_get("relation_type").map_err(read_err)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(PersonDetails {
            person,
            city_name,
            phone_numbers,
            relations,
        }))
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "SELECT EXISTS(SELECT 1 FROM persons WHERE id = $1 AND is_deleted = FALSE)",
                )
                .bind(id),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to check person existence: {e}"))
            })?;
        row.try_get(0)
            .map_err(|e| DomainError::infrastructure(format!("failed to read exists flag: {e}")))
    }

    async fn personal_number_exists(&self, personal_number: &str) -> Result<bool> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "SELECT EXISTS(
                        SELECT 1 FROM persons
                        WHERE personal_number = $1 AND is_deleted = FALSE
                     )",
                )
                .bind(personal_number.trim()),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to check personal number: {e}"))
            })?;
        row.try_get(0)
            .map_err(|e| DomainError::infrastructure(format!("failed to read exists flag: {e}")))
    }

    async fn list(&self, filter: &PersonFilter, page: PageRequest) -> Result<PagedResult<Person>> {
        fetch_page(
            &self.session,
            "id, name, last_name, personal_number, birth_date, gender, photo, city_id, is_deleted",
            "persons",
            filter,
            "id",
            page,
            Self::map_row,
        )
        .await
    }

    async fn add_phone(&self, person_id: i32, phone: &mut PersonPhoneNumber) -> Result<()> {
        let row = self
            .session
            .fetch_one(
                sqlx::query(
                    "INSERT INTO person_phone_numbers
                        (person_id, phone_number_type_id, phone_number, is_deleted)
                     VALUES ($1, $2, $3, $4)
                     RETURNING id",
                )
                .bind(person_id)
                .bind(phone.phone_number_type_id)
                .bind(&phone.phone_number)
                .bind(phone.is_deleted),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to insert phone number: {e}"))
            })?;
        phone.person_id = person_id;
        phone.id = row.try_get("id").map_err(|e| {
            DomainError::infrastructure(format!("failed to read phone number id: {e}"))
        })?;
        Ok(())
    }

    async fn update_phone(&self, phone: &PersonPhoneNumber) -> Result<()> {
        let result = self
            .session
            .execute(
                sqlx::query(
                    "UPDATE person_phone_numbers
                     SET phone_number_type_id = $2, phone_number = $3, is_deleted = $4
                     WHERE id = $1",
                )
                .bind(phone.id)
                .bind(phone.phone_number_type_id)
                .bind(&phone.phone_number)
                .bind(phone.is_deleted),
            )
            .await
            .map_err(|e| {
                DomainError::infrastructure(format!("failed to update phone number: {e}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("phone number", phone.id));
        }
        Ok(())
    }
}
