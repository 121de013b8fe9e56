// Profile documents and their embedded experience / education lists

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::errors::AppError;
use crate::core::models::{Education, Experience, OwnerSummary, Profile, ProfileView};
use crate::state::{modify_profile, ProfileStore, UserStore};

pub const INVALID_UPDATES_MESSAGE: &str = "Invalid Updates!";
pub const INVALID_VALUE_MESSAGE: &str = "Invalid field value";

/// Free-form profile fields accepted by an upsert
///
/// Every text field left out is written as an empty string. `skills` is a
/// comma-separated list and replaces the stored list only when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

impl ProfileFields {
    fn apply(self, profile: &mut Profile) {
        profile.company = self.company.unwrap_or_default();
        profile.website = self.website.unwrap_or_default();
        profile.location = self.location.unwrap_or_default();
        profile.status = self.status.unwrap_or_default();
        profile.bio = self.bio.unwrap_or_default();
        profile.githubusername = self.githubusername.unwrap_or_default();
        if let Some(skills) = self.skills.filter(|s| !s.is_empty()) {
            profile.skills = split_skills(&skills);
        }
        profile.social.youtube = self.youtube.unwrap_or_default();
        profile.social.twitter = self.twitter.unwrap_or_default();
        profile.social.facebook = self.facebook.unwrap_or_default();
        profile.social.linkedin = self.linkedin.unwrap_or_default();
        profile.social.instagram = self.instagram.unwrap_or_default();
    }
}

pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Field schema of a submitted subdocument
pub trait EntrySchema: DeserializeOwned {
    /// Every key a client may send
    const FIELDS: &'static [&'static str];
}

/// Accepted keys of a new experience entry; anything else is rejected
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperienceFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub current: bool,
    pub description: Option<String>,
}

impl EntrySchema for ExperienceFields {
    const FIELDS: &'static [&'static str] = &[
        "title",
        "company",
        "location",
        "from",
        "to",
        "current",
        "description",
    ];
}

/// Accepted keys of a new education entry; anything else is rejected
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EducationFields {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub current: bool,
    pub description: Option<String>,
}

impl EntrySchema for EducationFields {
    const FIELDS: &'static [&'static str] = &[
        "school",
        "degree",
        "fieldofstudy",
        "from",
        "to",
        "current",
        "description",
    ];
}

/// Check a submitted JSON object against a fixed field schema
///
/// A key outside the schema is "Invalid Updates!"; a known key holding a
/// value of the wrong shape is reported separately.
pub fn parse_entry<T: EntrySchema>(body: serde_json::Value) -> Result<T, AppError> {
    let keys_ok = match body.as_object() {
        Some(map) => map.keys().all(|k| T::FIELDS.contains(&k.as_str())),
        None => false,
    };
    if !keys_ok {
        debug!("Rejected subdocument with unknown fields");
        return Err(AppError::Validation(INVALID_UPDATES_MESSAGE.to_string()));
    }

    serde_json::from_value(body).map_err(|e| {
        debug!(error = %e, "Rejected subdocument values");
        AppError::Validation(format!("{}: {}", INVALID_VALUE_MESSAGE, e))
    })
}

/// Entry ids are UUIDs in any case; anything else matches no entry
fn parse_entry_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn parse_entry_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("'{}' is not a date", raw))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_entry_date(&s).map_err(de::Error::custom))
        .transpose()
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl From<ExperienceFields> for Experience {
    fn from(fields: ExperienceFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            company: fields.company,
            location: fields.location,
            from: fields.from,
            to: fields.to,
            current: fields.current,
            description: fields.description,
        }
    }
}

impl From<EducationFields> for Education {
    fn from(fields: EducationFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            school: fields.school,
            degree: fields.degree,
            fieldofstudy: fields.fieldofstudy,
            from: fields.from,
            to: fields.to,
            current: fields.current,
            description: fields.description,
        }
    }
}

/// Owner-scoped profile operations
///
/// Every mutation takes the owner id from the authenticated session; nothing
/// here accepts an owner chosen by the client.
pub struct ProfileManager {
    profiles: Arc<dyn ProfileStore>,
    users: Arc<dyn UserStore>,
}

impl ProfileManager {
    pub fn new(profiles: Arc<dyn ProfileStore>, users: Arc<dyn UserStore>) -> Self {
        Self { profiles, users }
    }

    /// Create the owner's profile, or overwrite the fields of the existing one
    pub async fn upsert_profile(&self, owner: Uuid, fields: ProfileFields) -> Result<Profile, AppError> {
        let existing = self.profiles.find_profile(owner).await?;
        let created = existing.is_none();

        let mut profile = existing.unwrap_or_else(|| Profile::empty(owner));
        fields.apply(&mut profile);
        profile.updated_at = Utc::now();
        self.profiles.save_profile(&profile).await?;

        info!(owner = %owner, created, "Profile saved");
        Ok(profile)
    }

    pub async fn add_experience(&self, owner: Uuid, fields: ExperienceFields) -> Result<Profile, AppError> {
        let (profile, ()) = modify_profile(self.profiles.as_ref(), owner, |profile| {
            profile.experience.insert(0, Experience::from(fields));
            Ok(())
        })
        .await?;
        Ok(profile)
    }

    /// Drop the experience entry with `entry_id`
    ///
    /// An id that matches nothing leaves the profile unchanged.
    pub async fn remove_experience(&self, owner: Uuid, entry_id: &str) -> Result<Profile, AppError> {
        let target = parse_entry_id(entry_id);
        let (profile, removed) = modify_profile(self.profiles.as_ref(), owner, |profile| {
            let before = profile.experience.len();
            profile.experience.retain(|e| Some(e.id) != target);
            Ok(before - profile.experience.len())
        })
        .await?;

        debug!(owner = %owner, removed, "Experience removal applied");
        Ok(profile)
    }

    pub async fn add_education(&self, owner: Uuid, fields: EducationFields) -> Result<Profile, AppError> {
        let (profile, ()) = modify_profile(self.profiles.as_ref(), owner, |profile| {
            profile.education.insert(0, Education::from(fields));
            Ok(())
        })
        .await?;
        Ok(profile)
    }

    /// Education counterpart of [`ProfileManager::remove_experience`]
    pub async fn remove_education(&self, owner: Uuid, entry_id: &str) -> Result<Profile, AppError> {
        let target = parse_entry_id(entry_id);
        let (profile, removed) = modify_profile(self.profiles.as_ref(), owner, |profile| {
            let before = profile.education.len();
            profile.education.retain(|e| Some(e.id) != target);
            Ok(before - profile.education.len())
        })
        .await?;

        debug!(owner = %owner, removed, "Education removal applied");
        Ok(profile)
    }

    /// Profile of `owner` joined with the owner's name and avatar
    pub async fn get_profile_view(&self, owner: Uuid) -> Result<ProfileView, AppError> {
        let profile = self
            .profiles
            .find_profile(owner)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        self.with_owner(profile).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<ProfileView>, AppError> {
        let profiles = self.profiles.list_profiles().await?;

        let mut views = Vec::with_capacity(profiles.len());
        for profile in profiles {
            views.push(self.with_owner(profile).await?);
        }
        Ok(views)
    }

    pub async fn delete_profile(&self, owner: Uuid) -> Result<bool, AppError> {
        self.profiles.delete_profile(owner).await
    }

    /// Attach owner name and avatar; a profile whose owner is gone gets `None`
    pub async fn with_owner(&self, profile: Profile) -> Result<ProfileView, AppError> {
        let user = self
            .users
            .find_user(profile.owner)
            .await?
            .map(|u| OwnerSummary {
                id: u.id,
                name: u.name,
                avatar: u.avatar,
            });

        Ok(ProfileView { profile, user })
    }
}
