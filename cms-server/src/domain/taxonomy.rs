use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::slug::resolve_slug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Tag {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct TagUsage {
    pub(crate) tag: Tag,
    pub(crate) post_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCategoryRequest {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
}

impl CreateCategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = normalize_name(&self.name, 100)?;
        let slug = resolve_slug(Some(&self.slug), &name, 100)?;
        Ok(Self {
            name,
            slug,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateTagRequest {
    pub(crate) name: String,
    pub(crate) slug: String,
}

impl CreateTagRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = normalize_name(&self.name, 50)?;
        let slug = resolve_slug(Some(&self.slug), &name, 50)?;
        Ok(Self { name, slug })
    }
}

fn normalize_name(name: &str, max_chars: usize) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > max_chars {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be non-empty and within the length limit",
        });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::{CreateCategoryRequest, CreateTagRequest};

    #[test]
    fn category_slug_is_derived_from_name() {
        let req = CreateCategoryRequest {
            name: " Systems Programming ".to_string(),
            slug: String::new(),
            description: "  low level  ".to_string(),
        }
        .validate()
        .expect("must validate");
        assert_eq!(req.name, "Systems Programming");
        assert_eq!(req.slug, "systems-programming");
        assert_eq!(req.description, "low level");
    }

    #[test]
    fn tag_name_length_is_limited() {
        let req = CreateTagRequest {
            name: "x".repeat(51),
            slug: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
