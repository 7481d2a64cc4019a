use std::env;
use std::path::PathBuf;

use crate::error::{Result, ToolError};

/// Name of the template workbook expected inside the source directory.
pub const TEMPLATE_FILE: &str = "FlooringTemplate.xlsx";

/// Subdirectory of the source directory used to stage vendor downloads.
pub const STAGING_SUBDIR: &str = "downloads";

/// Environment-supplied configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Vendor API access token.
    pub api_token: String,
    /// Identity the vendor calls are made on behalf of, when configured.
    pub assume_user: Option<String>,
    /// Working directory holding the template and the staging subdirectory.
    pub source_dir: PathBuf,
    /// Directory converted workbooks are written into.
    pub target_dir: PathBuf,
    /// Mail transport configuration; `None` disables the error digest.
    pub mail: Option<MailSettings>,
}

/// SMTP relay and addressing used for the error digest.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub server: String,
    pub from: String,
    pub to: String,
    pub cc: Option<String>,
}

impl Settings {
    /// Loads the configuration from the process environment.
    ///
    /// The mail block is optional as a group: when `MAIL_SERVER` is unset the
    /// digest is skipped entirely, but if it is set the From and To addresses
    /// become required.
    pub fn from_env() -> Result<Self> {
        let mail = match env::var("MAIL_SERVER") {
            Ok(server) => Some(MailSettings {
                server,
                from: require("MAIL_FROM")?,
                to: require("MAIL_TO")?,
                cc: env::var("MAIL_ALSO").ok(),
            }),
            Err(_) => None,
        };

        Ok(Settings {
            api_token: require("SMARTSHEET_API")?,
            assume_user: env::var("SMARTSHEET_USER").ok(),
            source_dir: PathBuf::from(require("SOURCE_DIR")?),
            target_dir: PathBuf::from(require("TARGET_DIR")?),
            mail,
        })
    }

    /// Directory vendor exports are downloaded into.
    pub fn staging_dir(&self) -> PathBuf {
        self.source_dir.join(STAGING_SUBDIR)
    }

    /// Path of the fixed-layout template workbook.
    pub fn template_path(&self) -> PathBuf {
        self.source_dir.join(TEMPLATE_FILE)
    }

    /// Path of the optional descriptor configuration file.
    pub fn reports_path(&self) -> PathBuf {
        self.source_dir.join("reports.json")
    }
}

fn require(name: &'static str) -> Result<String> {
    env::var(name).map_err(|_| ToolError::MissingEnv(name))
}
