use serde::{Deserialize, Deserializer, Serialize};

use crate::db::{PageRequest, PageSlice};
use crate::domain::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Paginated list envelope. `next`/`previous` are page numbers.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Returns `None` when the requested page lies past the last one.
    /// The first page always exists, even for an empty collection.
    pub fn build(slice: PageSlice<T>, request: PageRequest) -> Option<Self> {
        let pages = slice.total.div_ceil(request.page_size.max(1));

        if request.page == 0 || (request.page > 1 && request.page > pages) {
            return None;
        }

        Some(Self {
            count: slice.total,
            next: (request.page < pages).then_some(request.page + 1),
            previous: (request.page > 1).then_some(request.page - 1),
            results: slice.items,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    pub role: Option<Role>,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDto {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreDto {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleDto {
    pub id: i32,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub genre: Vec<GenreDto>,
    pub category: Option<CategoryDto>,
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
    pub page: Option<u64>,
}

// ============================================================================
// Reviews & comments
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDto {
    pub id: i32,
    /// Name of the reviewed title.
    pub title: String,
    pub text: String,
    pub author: String,
    pub score: i32,
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i32,
    /// Id of the commented review.
    pub review: i32,
    pub text: String,
    pub author: String,
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(total: u64) -> PageSlice<u64> {
        PageSlice {
            items: Vec::new(),
            total,
        }
    }

    #[test]
    fn test_page_links() {
        let page = Page::build(slice(25), PageRequest::new(2, 10)).unwrap();
        assert_eq!(page.count, 25);
        assert_eq!(page.previous, Some(1));
        assert_eq!(page.next, Some(3));

        let last = Page::build(slice(25), PageRequest::new(3, 10)).unwrap();
        assert_eq!(last.next, None);
    }

    #[test]
    fn test_page_out_of_range() {
        assert!(Page::build(slice(25), PageRequest::new(4, 10)).is_none());
        assert!(Page::build(slice(25), PageRequest::new(0, 10)).is_none());
        assert!(Page::build(slice(0), PageRequest::new(2, 10)).is_none());
    }

    #[test]
    fn test_empty_first_page_exists() {
        let page = Page::build(slice(0), PageRequest::new(1, 10)).unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let absent: UpdateTitleRequest = serde_json::from_str(r#"{"name":"Dune"}"#).unwrap();
        assert_eq!(absent.category, None);

        let cleared: UpdateTitleRequest = serde_json::from_str(r#"{"category":null}"#).unwrap();
        assert_eq!(cleared.category, Some(None));

        let set: UpdateTitleRequest = serde_json::from_str(r#"{"category":"books"}"#).unwrap();
        assert_eq!(set.category, Some(Some("books".to_string())));

        let profile: UpdateUserRequest =
            serde_json::from_str(r#"{"bio":null,"first_name":"Ann"}"#).unwrap();
        assert_eq!(profile.bio, Some(None));
        assert_eq!(profile.first_name, Some(Some("Ann".to_string())));
        assert_eq!(profile.last_name, None);
    }

    #[test]
    fn test_client_supplied_author_is_ignored() {
        let req: CreateReviewRequest =
            serde_json::from_str(r#"{"text":"ok","score":5,"author":"someone"}"#).unwrap();
        assert_eq!(req.score, 5);
    }
}
