use lettre::message::{header::ContentType, SinglePart};
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::MailSettings;
use crate::error::Result;

/// Subject line used for every error digest.
const DIGEST_SUBJECT: &str = "Smartsheet Flooring Error Report";

/// Ordered log buffer for one run, plus the run's error flag.
///
/// The log is an explicit value threaded through each pipeline stage rather
/// than ambient process state. Every line is echoed to stdout as it is
/// appended so the operator sees progress live; the buffer itself only
/// leaves the process as the body of the error digest.
#[derive(Debug, Default)]
pub struct RunLog {
    lines: Vec<String>,
    errors: bool,
}

impl RunLog {
    pub fn new() -> Self {
        RunLog::default()
    }

    /// Appends a line and echoes it to the operator.
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        println!("{line}");
        self.lines.push(line);
    }

    /// Appends a line, echoes it, and marks the run as failed.
    pub fn error(&mut self, line: impl Into<String>) {
        self.log(line);
        self.errors = true;
    }

    /// True once any stage has reported a failure this run.
    pub fn has_errors(&self) -> bool {
        self.errors
    }

    /// The accumulated lines joined for the digest body.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}

/// Sends the accumulated run log as a single error digest.
pub struct Notifier<'a> {
    mail: &'a MailSettings,
}

impl<'a> Notifier<'a> {
    pub fn new(mail: &'a MailSettings) -> Self {
        Notifier { mail }
    }

    /// Builds and sends the digest message over the configured SMTP relay.
    ///
    /// The body is wrapped in `<pre>` so the log lines keep their fixed-width
    /// layout in MIME-aware readers.
    pub fn send_digest(&self, log: &RunLog) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.mail.from.parse()?)
            .to(self.mail.to.parse()?)
            .subject(DIGEST_SUBJECT);
        if let Some(cc) = &self.mail.cc {
            builder = builder.cc(cc.parse()?);
        }

        let message = builder.singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(format!("<pre>\n{}\n</pre>\n", log.body())),
        )?;

        let mailer = SmtpTransport::builder_dangerous(&self.mail.server).build();
        mailer.send(&message)?;
        info!(to = %self.mail.to, "error digest sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_run_has_no_errors() {
        let mut log = RunLog::new();
        log.log("downloading");
        log.log("converting");
        assert!(!log.has_errors());
        assert_eq!(log.body(), "downloading\nconverting");
    }

    #[test]
    fn error_line_sets_the_flag_permanently() {
        let mut log = RunLog::new();
        log.log("starting");
        log.error("ERROR DOWNLOADING SHEET: timeout");
        log.log("continuing");
        assert!(log.has_errors());
        assert!(log.body().contains("ERROR DOWNLOADING SHEET: timeout"));
    }

    #[test]
    fn body_preserves_line_order() {
        let mut log = RunLog::new();
        log.log("first");
        log.error("second");
        log.log("third");
        assert_eq!(log.body(), "first\nsecond\nthird");
    }
}
