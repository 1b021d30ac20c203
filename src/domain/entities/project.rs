use std::borrow::Cow;

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::AppError;
use crate::utils::sanitize::{is_well_formed_url, parse_string_list, sanitize_text};

pub const MAX_TITLE_LENGTH: usize = 200;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description_en: String,
    pub description_id: String,
    pub image: String,
    pub technologies: Vec<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ProjectInsert {
    pub id: Uuid,
    pub title: String,
    pub description_en: String,
    pub description_id: String,
    pub image: String,
    pub technologies: Vec<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully resolved state written by an update; the service merges the
/// existing record with the supplied fields before the repository runs
/// a plain UPDATE.
#[derive(Debug)]
pub struct ProjectUpdate {
    pub title: String,
    pub description_en: String,
    pub description_id: String,
    pub image: String,
    pub technologies: Vec<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub order: i32,
    pub updated_at: DateTime<Utc>,
}

// ───── Multipart Intake ─────────────────────────────────────────────

#[derive(Debug, MultipartForm)]
pub struct ProjectForm {
    #[multipart(limit = "5MB")]
    pub image: Option<TempFile>,

    pub title: Option<Text<String>>,

    #[multipart(rename = "descriptionEn")]
    pub description_en: Option<Text<String>>,

    #[multipart(rename = "descriptionId")]
    pub description_id: Option<Text<String>>,

    pub technologies: Option<Text<String>>,

    #[multipart(rename = "demoUrl")]
    pub demo_url: Option<Text<String>>,

    #[multipart(rename = "githubUrl")]
    pub github_url: Option<Text<String>>,

    pub featured: Option<Text<String>>,

    pub order: Option<Text<String>>,
}

/// Raw field values exactly as they arrived over the wire. Parsing and
/// sanitization happen in one place, inside the typed conversions below.
#[derive(Debug, Default, Clone)]
pub struct RawProjectFields {
    pub title: Option<String>,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub technologies: Option<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: Option<String>,
    pub order: Option<String>,
}

impl ProjectForm {
    pub fn into_parts(self) -> (RawProjectFields, Option<TempFile>) {
        let fields = RawProjectFields {
            title: self.title.map(|t| t.into_inner()),
            description_en: self.description_en.map(|t| t.into_inner()),
            description_id: self.description_id.map(|t| t.into_inner()),
            technologies: self.technologies.map(|t| t.into_inner()),
            demo_url: self.demo_url.map(|t| t.into_inner()),
            github_url: self.github_url.map(|t| t.into_inner()),
            featured: self.featured.map(|t| t.into_inner()),
            order: self.order.map(|t| t.into_inner()),
        };
        (fields, self.image)
    }
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, Validate)]
pub struct NewProjectInput {
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(length(min = 1, message = "English description is required"))]
    pub description_en: String,

    #[validate(length(min = 1, message = "Indonesian description is required"))]
    pub description_id: String,

    #[validate(custom(function = "validate_technologies"))]
    pub technologies: Vec<String>,

    #[validate(custom(function = "validate_optional_url_demo"))]
    pub demo_url: Option<String>,

    #[validate(custom(function = "validate_optional_url_github"))]
    pub github_url: Option<String>,

    pub featured: bool,
    pub order: i32,
}

impl NewProjectInput {
    pub fn from_raw(raw: RawProjectFields) -> Result<Self, AppError> {
        let technologies = match raw.technologies.as_deref() {
            Some(value) => parse_string_list("technologies", value)?,
            None => Vec::new(),
        };

        let input = NewProjectInput {
            title: sanitize_text(raw.title.as_deref().unwrap_or_default()),
            description_en: sanitize_text(raw.description_en.as_deref().unwrap_or_default()),
            description_id: sanitize_text(raw.description_id.as_deref().unwrap_or_default()),
            technologies,
            demo_url: raw.demo_url.filter(|s| !s.trim().is_empty()),
            github_url: raw.github_url.filter(|s| !s.trim().is_empty()),
            featured: parse_bool_flag(raw.featured.as_deref()),
            order: raw
                .order
                .as_deref()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(0),
        };

        input.validate()?;
        Ok(input)
    }

    pub fn into_insert(self, image: String) -> ProjectInsert {
        let now = Utc::now();
        ProjectInsert {
            id: Uuid::new_v4(),
            title: self.title,
            description_en: self.description_en,
            description_id: self.description_id,
            image,
            technologies: self.technologies,
            demo_url: self.demo_url,
            github_url: self.github_url,
            featured: self.featured,
            order: self.order,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: absent fields keep their previous values.
#[derive(Debug, Default, Validate)]
pub struct ProjectPatch {
    #[validate(custom(function = "validate_optional_title"))]
    pub title: Option<String>,

    pub description_en: Option<String>,
    pub description_id: Option<String>,

    #[validate(custom(function = "validate_optional_technologies"))]
    pub technologies: Option<Vec<String>>,

    #[validate(custom(function = "validate_optional_url_demo"))]
    pub demo_url: Option<String>,

    #[validate(custom(function = "validate_optional_url_github"))]
    pub github_url: Option<String>,

    pub featured: Option<bool>,
    pub order: Option<i32>,
}

impl ProjectPatch {
    pub fn from_raw(raw: RawProjectFields) -> Result<Self, AppError> {
        let technologies = match raw.technologies.as_deref() {
            Some(value) => Some(parse_string_list("technologies", value)?),
            None => None,
        };

        let patch = ProjectPatch {
            title: raw.title.map(|s| sanitize_text(&s)),
            description_en: raw.description_en.map(|s| sanitize_text(&s)),
            description_id: raw.description_id.map(|s| sanitize_text(&s)),
            technologies,
            demo_url: raw.demo_url.filter(|s| !s.trim().is_empty()),
            github_url: raw.github_url.filter(|s| !s.trim().is_empty()),
            featured: raw.featured.as_deref().map(|v| v == "true"),
            order: raw.order.as_deref().and_then(|v| v.parse::<i32>().ok()),
        };

        patch.validate()?;
        Ok(patch)
    }

    /// Applies this patch on top of the current record; `image` has been
    /// resolved by the service (new upload or retained previous value).
    pub fn apply(self, current: &Project, image: String) -> ProjectUpdate {
        ProjectUpdate {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description_en: self
                .description_en
                .unwrap_or_else(|| current.description_en.clone()),
            description_id: self
                .description_id
                .unwrap_or_else(|| current.description_id.clone()),
            image,
            technologies: self
                .technologies
                .unwrap_or_else(|| current.technologies.clone()),
            demo_url: self.demo_url.or_else(|| current.demo_url.clone()),
            github_url: self.github_url.or_else(|| current.github_url.clone()),
            featured: self.featured.unwrap_or(current.featured),
            order: self.order.unwrap_or(current.order),
            updated_at: Utc::now(),
        }
    }
}

// ───── List Queries ─────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct ProjectFilter {
    pub featured: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than an explicit `asc` sorts descending, newest
    /// first being the natural reading order for a portfolio.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") | Some("ASC") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Allow-listed sort columns. Anything outside the list silently maps to
/// the default ordering, so arbitrary query values never reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSort {
    #[default]
    Default,
    Title,
    Order,
    CreatedAt,
}

impl ProjectSort {
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("title") => ProjectSort::Title,
            Some("order") => ProjectSort::Order,
            Some("createdAt") | Some("created_at") => ProjectSort::CreatedAt,
            _ => ProjectSort::Default,
        }
    }

    pub fn order_by(self, direction: SortDirection) -> String {
        match self {
            ProjectSort::Default => r#""order" ASC, created_at DESC"#.to_string(),
            ProjectSort::Title => format!("title {}", direction.as_sql()),
            ProjectSort::Order => format!(r#""order" {}"#, direction.as_sql()),
            ProjectSort::CreatedAt => format!("created_at {}", direction.as_sql()),
        }
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

fn parse_bool_flag(value: Option<&str>) -> bool {
    matches!(value, Some("true"))
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(new_validation_error("title_required", "Title is required"));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(new_validation_error(
            "title_too_long",
            "Title must be less than 200 characters",
        ));
    }
    Ok(())
}

fn validate_optional_title(title: &String) -> Result<(), ValidationError> {
    validate_title(title)
}

pub fn validate_technologies(technologies: &Vec<String>) -> Result<(), ValidationError> {
    if technologies.is_empty() {
        return Err(new_validation_error(
            "technologies_required",
            "At least one technology is required",
        ));
    }
    if technologies.iter().any(|t| t.trim().is_empty()) {
        return Err(new_validation_error(
            "technologies_empty_entry",
            "Technologies must be non-empty strings",
        ));
    }
    Ok(())
}

fn validate_optional_technologies(technologies: &Vec<String>) -> Result<(), ValidationError> {
    validate_technologies(technologies)
}

fn validate_optional_url_demo(url: &String) -> Result<(), ValidationError> {
    if !is_well_formed_url(url) {
        return Err(new_validation_error(
            "invalid_url",
            "Invalid demo URL format",
        ));
    }
    Ok(())
}

fn validate_optional_url_github(url: &String) -> Result<(), ValidationError> {
    if !is_well_formed_url(url) {
        return Err(new_validation_error(
            "invalid_url",
            "Invalid GitHub URL format",
        ));
    }
    Ok(())
}

pub(crate) fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> RawProjectFields {
        RawProjectFields {
            title: Some("My Project".into()),
            description_en: Some("English text".into()),
            description_id: Some("Teks Indonesia".into()),
            technologies: Some(r#"["React","Node.js"]"#.into()),
            ..Default::default()
        }
    }

    #[test]
    fn json_and_csv_technologies_yield_same_list() {
        let json = NewProjectInput::from_raw(valid_raw()).unwrap();
        let csv = NewProjectInput::from_raw(RawProjectFields {
            technologies: Some("React, Node.js".into()),
            ..valid_raw()
        })
        .unwrap();

        assert_eq!(json.technologies, vec!["React", "Node.js"]);
        assert_eq!(csv.technologies, json.technologies);
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let err = NewProjectInput::from_raw(RawProjectFields::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn overlong_title_rejected() {
        let err = NewProjectInput::from_raw(RawProjectFields {
            title: Some("x".repeat(201)),
            ..valid_raw()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn bad_optional_url_rejected() {
        let err = NewProjectInput::from_raw(RawProjectFields {
            demo_url: Some("not a url".into()),
            ..valid_raw()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn inputs_are_sanitized() {
        let input = NewProjectInput::from_raw(RawProjectFields {
            title: Some("  <b>Title</b>  ".into()),
            ..valid_raw()
        })
        .unwrap();
        assert_eq!(input.title, "bTitle/b");
    }

    #[test]
    fn featured_and_order_parse_with_defaults() {
        let input = NewProjectInput::from_raw(RawProjectFields {
            featured: Some("true".into()),
            order: Some("7".into()),
            ..valid_raw()
        })
        .unwrap();
        assert!(input.featured);
        assert_eq!(input.order, 7);

        let input = NewProjectInput::from_raw(valid_raw()).unwrap();
        assert!(!input.featured);
        assert_eq!(input.order, 0);
    }

    #[test]
    fn sort_allow_list_falls_back_to_default() {
        assert_eq!(ProjectSort::from_query(Some("title")), ProjectSort::Title);
        assert_eq!(
            ProjectSort::from_query(Some("createdAt")),
            ProjectSort::CreatedAt
        );
        assert_eq!(
            ProjectSort::from_query(Some("id; DROP TABLE projects")),
            ProjectSort::Default
        );
        assert_eq!(
            ProjectSort::Default.order_by(SortDirection::Desc),
            r#""order" ASC, created_at DESC"#
        );
        assert_eq!(
            ProjectSort::Title.order_by(SortDirection::Desc),
            "title DESC"
        );
    }

    #[test]
    fn sort_direction_defaults_to_descending() {
        assert_eq!(SortDirection::from_query(None), SortDirection::Desc);
        assert_eq!(SortDirection::from_query(Some("junk")), SortDirection::Desc);
        assert_eq!(SortDirection::from_query(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::from_query(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::from_query(Some("ASC")), SortDirection::Asc);
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let patch = ProjectPatch::from_raw(RawProjectFields {
            title: Some("New Title".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(patch.title.as_deref(), Some("New Title"));
        assert!(patch.description_en.is_none());
        assert!(patch.technologies.is_none());
    }
}
