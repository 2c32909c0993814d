//! JSON:API request and response bodies

use serde::{Deserialize, Serialize};

/// `GET /api/lists/{id}/profiles/` response
#[derive(Debug, Deserialize)]
pub struct ListProfilesResponse {
    #[serde(default)]
    pub data: Vec<ResourceRef>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl ListProfilesResponse {
    pub fn next_link(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.next.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct ResourceRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

/// JSON:API error document
#[derive(Debug, Default, Deserialize)]
pub struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorDocument {
    /// First error's detail, falling back to its title then code
    pub fn summary(&self) -> Option<String> {
        let first = self.errors.first()?;
        first
            .detail
            .clone()
            .or_else(|| first.title.clone())
            .or_else(|| first.code.clone())
    }

    /// Whether the first error says the target resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.errors
            .first()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| code == "not_found" || code == "does_not_exist")
    }
}

/// `POST /api/data-privacy-deletion-jobs/` body
#[derive(Debug, Serialize)]
pub struct DeletionJobRequest {
    data: DeletionJob,
}

#[derive(Debug, Serialize)]
struct DeletionJob {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: DeletionJobAttributes,
}

#[derive(Debug, Serialize)]
struct DeletionJobAttributes {
    profile: ProfileEnvelope,
}

#[derive(Debug, Serialize)]
struct ProfileEnvelope {
    data: ProfileData,
}

#[derive(Debug, Serialize)]
struct ProfileData {
    #[serde(rename = "type")]
    kind: &'static str,
    id: String,
    attributes: ProfileAttributes,
}

#[derive(Debug, Serialize)]
struct ProfileAttributes {
    id: String,
}

impl DeletionJobRequest {
    pub fn for_profile(profile_id: &str) -> Self {
        Self {
            data: DeletionJob {
                kind: "data-privacy-deletion-job",
                attributes: DeletionJobAttributes {
                    profile: ProfileEnvelope {
                        data: ProfileData {
                            kind: "profile",
                            id: profile_id.to_string(),
                            attributes: ProfileAttributes {
                                id: profile_id.to_string(),
                            },
                        },
                    },
                },
            },
        }
    }
}
