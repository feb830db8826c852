//! Response record builder

use domain::{Cookies, Headers, RecordId, ResponseRecord};
use http::StatusCode;

use crate::{application_info::ApplicationInfo, call_context::CallContext};

/// Builds a [`ResponseRecord`] once the handler has produced a response
#[derive(Debug)]
pub struct ResponseRecordBuilder<'a> {
    record: ResponseRecord,
    ctx: &'a CallContext,
    app: &'a ApplicationInfo,
}

impl<'a> ResponseRecordBuilder<'a> {
    pub fn new(ctx: &'a CallContext, app: &'a ApplicationInfo) -> Self {
        Self {
            record: ResponseRecord::new(),
            ctx,
            app,
        }
    }

    /// Back-reference to the request; the empty id counts as none
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<RecordId>) -> Self {
        self.record.request_id = request_id.and_then(RecordId::non_empty);
        self
    }

    #[must_use]
    pub fn with_application_name(mut self, name: Option<String>) -> Self {
        self.record.application_name = Some(name.unwrap_or_else(|| self.app.name.clone()));
        self
    }

    #[must_use]
    pub fn with_application_version(mut self, version: Option<String>) -> Self {
        self.record.application_version =
            Some(version.unwrap_or_else(|| self.app.version.clone()));
        self
    }

    #[must_use]
    pub fn with_machine_name(mut self, machine_name: Option<String>) -> Self {
        self.record.machine_name =
            Some(machine_name.unwrap_or_else(|| self.app.machine_name.clone()));
        self
    }

    #[must_use]
    pub fn with_http_status_code(mut self, status: Option<StatusCode>) -> Self {
        self.record.http_status_code = status
            .or_else(|| self.ctx.response_status())
            .map(|status| i32::from(status.as_u16()));
        self
    }

    /// Response headers as the handler set them; no filter applies
    #[must_use]
    pub fn with_response_headers(mut self, headers: Option<Headers>) -> Self {
        self.record.response_headers =
            headers.unwrap_or_else(|| self.ctx.response_headers().clone());
        self
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: Option<Cookies>) -> Self {
        self.record.cookies = cookies.unwrap_or_else(|| self.ctx.response_cookies().clone());
        self
    }

    #[must_use]
    pub const fn with_elapsed_milliseconds(mut self, elapsed: Option<u64>) -> Self {
        self.record.elapsed_milliseconds = elapsed;
        self
    }

    /// Id of the record being built
    pub const fn record_id(&self) -> RecordId {
        self.record.id()
    }

    pub fn build(self) -> ResponseRecord {
        self.record
    }
}
