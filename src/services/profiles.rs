use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::{Education, Experience, OwnerView, Post, Profile, ProfileView, SocialLinks, User};
use crate::store::collection::{Collection, Doc};
use crate::store::{DocumentStore, Filter, Sort, StoreError, POSTS, PROFILES, USERS};

/// Bound on compare-and-swap retries for read-modify-write paths.
const CAS_RETRIES: usize = 3;

/// Partial profile fields as supplied by the caller. Absent fields are left
/// untouched on update and omitted on create; only `status` and `skills` are
/// mandatory. `skills` arrives as a comma-delimited string.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
    pub status: Option<String>,
    pub skills: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExperienceInput {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EducationInput {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Profile upsert, embedded experience/education lists and the account
/// deletion cascade. Profiles are always fetched by the caller's own
/// identity on mutation, so cross-user tampering is structurally prevented.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Collection<Profile>,
    posts: Collection<Post>,
    users: Collection<User>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        let op_timeout = Duration::from_millis(config.store.op_timeout_ms);
        Self {
            profiles: Collection::new(PROFILES, store.clone(), op_timeout),
            posts: Collection::new(POSTS, store.clone(), op_timeout),
            users: Collection::new(USERS, store, op_timeout),
        }
    }

    /// Create-or-update the caller's single profile. Runs through the store's
    /// atomic keyed upsert so no race can leave two profiles for one user.
    pub async fn upsert(&self, identity: &AuthUser, input: ProfileInput) -> Result<ProfileView, ApiError> {
        let (status, skills) = validate_profile(&input)?;

        let social = SocialLinks {
            youtube: input.youtube.clone(),
            twitter: input.twitter.clone(),
            facebook: input.facebook.clone(),
            linkedin: input.linkedin.clone(),
            instagram: input.instagram.clone(),
        };

        // Patch carries only the supplied fields; the social sub-record is
        // rebuilt from the supplied links on every upsert.
        let mut patch = serde_json::Map::new();
        patch.insert("user".to_string(), json!(identity.user_id));
        patch.insert("status".to_string(), json!(status));
        patch.insert("skills".to_string(), json!(skills));
        patch.insert("social".to_string(), json!(social));
        insert_if_present(&mut patch, "company", &input.company);
        insert_if_present(&mut patch, "website", &input.website);
        insert_if_present(&mut patch, "location", &input.location);
        insert_if_present(&mut patch, "bio", &input.bio);
        insert_if_present(&mut patch, "githubusername", &input.githubusername);

        let profile = Profile {
            user: identity.user_id,
            status,
            skills,
            company: input.company,
            website: input.website,
            location: input.location,
            bio: input.bio,
            githubusername: input.githubusername,
            social,
            experience: Vec::new(),
            education: Vec::new(),
            date: Utc::now(),
        };

        let filter = Filter::eq("user", identity.user_id);
        let doc = self
            .profiles
            .upsert_one(&filter, &profile, Value::Object(patch))
            .await?;
        self.view(doc).await
    }

    pub async fn add_experience(
        &self,
        identity: &AuthUser,
        input: ExperienceInput,
    ) -> Result<ProfileView, ApiError> {
        let mut field_errors = HashMap::new();
        let title = required_text(&input.title, "title", "Title is required", &mut field_errors);
        let company = required_text(&input.company, "company", "Company is required", &mut field_errors);
        if input.from.is_none() {
            field_errors.insert("from".to_string(), "From date is required".to_string());
        }
        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Missing required fields", Some(field_errors)));
        }
        let from = input.from.unwrap_or_default();

        let doc = self
            .mutate(identity.user_id, |profile| {
                profile.experience.insert(
                    0,
                    Experience {
                        id: Uuid::new_v4(),
                        title: title.clone(),
                        company: company.clone(),
                        location: input.location.clone(),
                        from,
                        to: input.to,
                        current: input.current,
                        description: input.description.clone(),
                    },
                );
                Ok(())
            })
            .await?;
        self.view(doc).await
    }

    pub async fn remove_experience(
        &self,
        identity: &AuthUser,
        entry_id: Uuid,
    ) -> Result<ProfileView, ApiError> {
        let doc = self
            .mutate(identity.user_id, |profile| {
                let pos = profile
                    .experience
                    .iter()
                    .position(|e| e.id == entry_id)
                    .ok_or_else(|| ApiError::not_found("Experience entry not found."))?;
                profile.experience.remove(pos);
                Ok(())
            })
            .await?;
        self.view(doc).await
    }

    pub async fn add_education(
        &self,
        identity: &AuthUser,
        input: EducationInput,
    ) -> Result<ProfileView, ApiError> {
        let mut field_errors = HashMap::new();
        let school = required_text(&input.school, "school", "School is required", &mut field_errors);
        let degree = required_text(&input.degree, "degree", "Degree is required", &mut field_errors);
        let fieldofstudy = required_text(
            &input.fieldofstudy,
            "fieldofstudy",
            "Field of study is required",
            &mut field_errors,
        );
        if input.from.is_none() {
            field_errors.insert("from".to_string(), "From date is required".to_string());
        }
        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Missing required fields", Some(field_errors)));
        }
        let from = input.from.unwrap_or_default();

        let doc = self
            .mutate(identity.user_id, |profile| {
                profile.education.insert(
                    0,
                    Education {
                        id: Uuid::new_v4(),
                        school: school.clone(),
                        degree: degree.clone(),
                        fieldofstudy: fieldofstudy.clone(),
                        from,
                        to: input.to,
                        current: input.current,
                        description: input.description.clone(),
                    },
                );
                Ok(())
            })
            .await?;
        self.view(doc).await
    }

    pub async fn remove_education(
        &self,
        identity: &AuthUser,
        entry_id: Uuid,
    ) -> Result<ProfileView, ApiError> {
        let doc = self
            .mutate(identity.user_id, |profile| {
                let pos = profile
                    .education
                    .iter()
                    .position(|e| e.id == entry_id)
                    .ok_or_else(|| ApiError::not_found("Education entry not found."))?;
                profile.education.remove(pos);
                Ok(())
            })
            .await?;
        self.view(doc).await
    }

    pub async fn me(&self, identity: &AuthUser) -> Result<ProfileView, ApiError> {
        self.get_by_user_id(identity.user_id).await
    }

    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<ProfileView, ApiError> {
        let doc = self
            .profiles
            .find_one(&Filter::eq("user", user_id))
            .await?
            .ok_or_else(|| ApiError::not_found("Profile not found."))?;
        self.view(doc).await
    }

    pub async fn list_all(&self) -> Result<Vec<ProfileView>, ApiError> {
        let docs = self.profiles.find_many(&Filter::all(), Sort::CreatedDesc).await?;
        let users = self.users.find_many(&Filter::all(), Sort::Unsorted).await?;
        let owners: HashMap<Uuid, OwnerView> = users
            .iter()
            .map(|doc| {
                (
                    doc.id,
                    OwnerView {
                        id: doc.id,
                        name: doc.data.name.clone(),
                        avatar: doc.data.avatar.clone(),
                    },
                )
            })
            .collect();

        // Profiles whose owner is gone mid-cascade are skipped rather than
        // failing the whole listing.
        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                let owner = owners.get(&doc.data.user).cloned()?;
                Some(ProfileView::new(doc, owner))
            })
            .collect())
    }

    /// Account deletion cascade: posts, then profile, then the user record.
    /// Each step tolerates already-absent as success, so a failed cascade can
    /// be retried whole. No rollback on partial failure.
    pub async fn delete_account(&self, identity: &AuthUser) -> Result<(), ApiError> {
        self.posts.delete_many(&Filter::eq("user", identity.user_id)).await?;
        self.profiles.delete_one(&Filter::eq("user", identity.user_id)).await?;
        self.users.delete_one(&Filter::by_id(identity.user_id)).await?;
        Ok(())
    }

    /// Read-modify-write on the caller's profile with bounded CAS retries.
    async fn mutate<F>(&self, user_id: Uuid, apply: F) -> Result<Doc<Profile>, ApiError>
    where
        F: Fn(&mut Profile) -> Result<(), ApiError>,
    {
        let filter = Filter::eq("user", user_id);
        for _ in 0..CAS_RETRIES {
            let mut doc = self
                .profiles
                .find_one(&filter)
                .await?
                .ok_or_else(|| ApiError::not_found("Profile not found."))?;

            apply(&mut doc.data)?;

            match self.profiles.replace(&doc).await {
                Ok(updated) => return Ok(updated),
                Err(StoreError::VersionConflict(_)) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        Err(ApiError::conflict("The profile was modified concurrently, please retry."))
    }

    async fn view(&self, doc: Doc<Profile>) -> Result<ProfileView, ApiError> {
        let owner = self
            .users
            .find_one(&Filter::by_id(doc.data.user))
            .await?
            .map(|user| OwnerView {
                id: user.id,
                name: user.data.name,
                avatar: user.data.avatar,
            })
            .ok_or_else(|| ApiError::not_found("User not found."))?;
        Ok(ProfileView::new(doc, owner))
    }
}

fn validate_profile(input: &ProfileInput) -> Result<(String, Vec<String>), ApiError> {
    let mut field_errors = HashMap::new();

    let status = input.status.as_deref().unwrap_or_default().trim().to_string();
    if status.is_empty() {
        field_errors.insert("status".to_string(), "Status is required".to_string());
    }

    let skills = split_skills(input.skills.as_deref().unwrap_or_default());
    if skills.is_empty() {
        field_errors.insert("skills".to_string(), "Skills is required".to_string());
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Missing required fields", Some(field_errors)));
    }

    Ok((status, skills))
}

/// Split a comma-delimited skills string, trimming each element and dropping
/// empties. Element order is preserved.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn required_text(
    value: &Option<String>,
    field: &str,
    message: &str,
    field_errors: &mut HashMap<String, String>,
) -> String {
    let text = value.as_deref().unwrap_or_default().trim().to_string();
    if text.is_empty() {
        field_errors.insert(field.to_string(), message.to_string());
    }
    text
}

fn insert_if_present(patch: &mut serde_json::Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        patch.insert(key.to_string(), json!(value));
    }
}
