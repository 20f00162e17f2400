//! Deployment configuration for the hosting collaborator.
//!
//! Credentials arrive through an explicit lookup rather than process-wide
//! environment reads, and the whole config is validated before any request
//! is planned. Nothing here touches the network.

use crate::error::{AvowError, AvowResult};
use crate::link::verify_link;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::OnceLock;

pub const API_TOKEN_VAR: &str = "CLOUDFLARE_API_TOKEN";
pub const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_PROJECT: &str = "avow-protocol";
const PRODUCTION_BRANCH: &str = "main";
const BUILD_COMMAND: &str = "deno task build";

static ACCOUNT_ID_RE: OnceLock<Regex> = OnceLock::new();
static PROJECT_RE: OnceLock<Regex> = OnceLock::new();
static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();

fn account_id_re() -> &'static Regex {
    ACCOUNT_ID_RE.get_or_init(|| Regex::new(r"^[0-9a-f]{32}$").expect("valid regex"))
}

fn project_re() -> &'static Regex {
    PROJECT_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("valid regex")
    })
}

fn domain_re() -> &'static Regex {
    DOMAIN_RE.get_or_init(|| {
        Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
            .expect("valid regex")
    })
}

/// A hosted project and the custom domains attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDomains {
    pub name: String,
    pub domains: Vec<String>,
}

impl ProjectDomains {
    pub fn new(name: &str, domains: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Projects and custom domains managed by default.
pub fn default_projects() -> Vec<ProjectDomains> {
    vec![
        ProjectDomains::new(DEFAULT_PROJECT, &["avow-protocol.org", "www.avow-protocol.org"]),
        ProjectDomains::new("a2ml", &["a2ml.org", "www.a2ml.org"]),
        ProjectDomains::new("k9-svc", &["k9-svc.org", "www.k9-svc.org"]),
    ]
}

/// One request the provisioning collaborator would issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedRequest {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Issued only when the preceding lookup finds no such project.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub only_if_absent: bool,
}

impl PlannedRequest {
    fn get(url: String) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            body: None,
            only_if_absent: false,
        }
    }

    fn post(url: String, body: Value) -> Self {
        Self {
            method: "POST".to_string(),
            url,
            body: Some(body),
            only_if_absent: false,
        }
    }
}

impl fmt::Display for PlannedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if let Some(body) = &self.body {
            write!(f, " {}", body)?;
        }
        if self.only_if_absent {
            write!(f, " (if absent)")?;
        }
        Ok(())
    }
}

/// Deployment settings. Not serializable, and `Debug` redacts the token.
#[derive(Clone, PartialEq)]
pub struct DeployConfig {
    pub api_token: String,
    pub account_id: String,
    pub api_base: String,
    pub projects: Vec<ProjectDomains>,
}

impl DeployConfig {
    pub fn new(api_token: String, account_id: String) -> Self {
        Self {
            api_token,
            account_id,
            api_base: DEFAULT_API_BASE.to_string(),
            projects: default_projects(),
        }
    }

    /// Build from a variable lookup, e.g. `|k| std::env::var(k).ok()`.
    /// Missing variables become empty fields and are caught by `validate`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(
            lookup(API_TOKEN_VAR).unwrap_or_default(),
            lookup(ACCOUNT_ID_VAR).unwrap_or_default(),
        )
    }

    pub fn with_projects(mut self, projects: Vec<ProjectDomains>) -> Self {
        self.projects = projects;
        self
    }

    pub fn validate(&self) -> AvowResult<()> {
        if self.api_token.trim().is_empty() {
            return Err(AvowError::MissingField {
                field: API_TOKEN_VAR.to_string(),
            });
        }
        if self.account_id.trim().is_empty() {
            return Err(AvowError::MissingField {
                field: ACCOUNT_ID_VAR.to_string(),
            });
        }
        if !account_id_re().is_match(&self.account_id) {
            return Err(AvowError::Validation {
                field: "account_id".to_string(),
                message: "account id must be 32 lowercase hex characters".to_string(),
            });
        }

        let verdict = verify_link(&self.api_base);
        if !verdict.is_success() {
            return Err(AvowError::InsecureEndpoint {
                endpoint: self.api_base.clone(),
                verdict: verdict.to_string(),
            });
        }

        if self.projects.is_empty() {
            return Err(AvowError::MissingField {
                field: "projects".to_string(),
            });
        }
        for project in &self.projects {
            if !project_re().is_match(&project.name) {
                return Err(AvowError::Validation {
                    field: "project".to_string(),
                    message: format!("'{}' is not a valid project name", project.name),
                });
            }
            for domain in &project.domains {
                if !domain_re().is_match(domain) {
                    return Err(AvowError::Validation {
                        field: "domain".to_string(),
                        message: format!("'{}' is not a valid domain name", domain),
                    });
                }
            }
        }
        Ok(())
    }

    /// Requests to issue, in order: per project, a lookup, a create that
    /// only applies when the lookup misses, then one attachment per domain.
    pub fn plan(&self) -> AvowResult<Vec<PlannedRequest>> {
        self.validate()?;

        let base = self.api_base.trim_end_matches('/');
        let projects_url = format!("{}/accounts/{}/pages/projects", base, self.account_id);
        let mut requests = Vec::new();
        for project in &self.projects {
            let project_url = format!("{}/{}", projects_url, project.name);
            requests.push(PlannedRequest::get(project_url.clone()));

            let mut create = PlannedRequest::post(
                projects_url.clone(),
                json!({
                    "name": project.name,
                    "production_branch": PRODUCTION_BRANCH,
                    "build_config": {
                        "build_command": BUILD_COMMAND,
                        "destination_dir": ".",
                        "root_dir": "/",
                    },
                }),
            );
            create.only_if_absent = true;
            requests.push(create);

            for domain in &project.domains {
                requests.push(PlannedRequest::post(
                    format!("{}/domains", project_url),
                    json!({ "name": domain }),
                ));
            }
        }
        tracing::info!(requests = requests.len(), "deployment plan built");
        Ok(requests)
    }
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("api_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("api_base", &self.api_base)
            .field("projects", &self.projects)
            .finish()
    }
}
