//! Error record builder

use domain::{Cookies, ErrorRecord, FaultInfo, FormFields, HeaderFilter, Headers, RecordId};
use http::StatusCode;

use crate::{application_info::ApplicationInfo, call_context::CallContext};

/// Inserted between the detail text and an appended backtrace
pub const FULL_TRACE_SEPARATOR: &str = "\n\nFull Trace:\n\n";

/// PascalCase name of an HTTP status, e.g. `NotFound` for 404
///
/// Falls back to the numeric code for statuses without a canonical reason.
pub fn status_name(status: StatusCode) -> String {
    status.canonical_reason().map_or_else(
        || status.as_u16().to_string(),
        |reason| {
            reason
                .split([' ', '-'])
                .flat_map(|word| {
                    let mut chars = word.chars();
                    chars
                        .next()
                        .map(|first| first.to_ascii_uppercase())
                        .into_iter()
                        .chain(chars)
                })
                .filter(char::is_ascii_alphanumeric)
                .collect()
        },
    )
}

/// Builds an [`ErrorRecord`] from a call and the fault it ran into
#[derive(Debug)]
pub struct ErrorRecordBuilder<'a> {
    record: ErrorRecord,
    ctx: &'a CallContext,
    app: &'a ApplicationInfo,
    header_filter: &'a HeaderFilter,
    fault: Option<&'a FaultInfo>,
}

impl<'a> ErrorRecordBuilder<'a> {
    pub fn new(
        ctx: &'a CallContext,
        app: &'a ApplicationInfo,
        header_filter: &'a HeaderFilter,
    ) -> Self {
        Self {
            record: ErrorRecord::new(),
            ctx,
            app,
            header_filter,
            fault: None,
        }
    }

    /// Use this fault for the exception-derived fields
    #[must_use]
    pub const fn with_fault(mut self, fault: &'a FaultInfo) -> Self {
        self.fault = Some(fault);
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

    // ------------------------------------------------------------------
    // Context properties
    // ------------------------------------------------------------------

    #[must_use]
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.record.host = host.or_else(|| self.ctx.host());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.record.url = Some(url.unwrap_or_else(|| self.ctx.uri().to_string()));
        self
    }

    #[must_use]
    pub fn with_http_method(mut self, method: Option<String>) -> Self {
        self.record.http_method = Some(method.unwrap_or_else(|| self.ctx.method().to_string()));
        self
    }

    #[must_use]
    pub fn with_http_status_code(mut self, status: Option<StatusCode>) -> Self {
        self.record.http_status_code = status
            .or_else(|| self.ctx.response_status())
            .map(|status| i32::from(status.as_u16()));
        self
    }

    #[must_use]
    pub fn with_ip_address(mut self, ip: Option<String>) -> Self {
        self.record.ip_address = ip.or_else(|| self.ctx.remote_addr().map(|a| a.to_string()));
        self
    }

    #[must_use]
    pub fn with_query_string(mut self, query: Option<String>) -> Self {
        self.record.query_string = query.or_else(|| self.ctx.query_string());
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: Option<FormFields>) -> Self {
        self.record.form = form.unwrap_or_else(|| self.ctx.form().clone());
        self
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: Option<Cookies>) -> Self {
        self.record.cookies = cookies.unwrap_or_else(|| self.ctx.cookies().clone());
        self
    }

    /// Request headers, after the header filter
    #[must_use]
    pub fn with_request_headers(mut self, headers: Option<Headers>) -> Self {
        let headers = headers.as_ref().unwrap_or_else(|| self.ctx.request_headers());
        self.record.request_headers = self.header_filter.filter(headers);
        self
    }

    /// Host, url, method, status, ip, query string, form, cookies, headers
    #[must_use]
    pub fn with_all_context_properties(self) -> Self {
        self.with_host(None)
            .with_url(None)
            .with_http_method(None)
            .with_http_status_code(None)
            .with_ip_address(None)
            .with_query_string(None)
            .with_form(None)
            .with_cookies(None)
            .with_request_headers(None)
    }

    // ------------------------------------------------------------------
    // Exception properties
    // ------------------------------------------------------------------

    #[must_use]
    pub fn with_type(mut self, error_type: Option<String>) -> Self {
        self.record.error_type = error_type.or_else(|| self.fault.map(|f| f.type_name.clone()));
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.record.source = source.or_else(|| self.fault.and_then(|f| f.source.clone()));
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.record.message = message.or_else(|| self.fault.map(|f| f.message.clone()));
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.record.detail = detail.or_else(|| self.fault.map(|f| f.detail.clone()));
        self
    }

    #[must_use]
    pub fn with_sql(mut self, sql: Option<String>) -> Self {
        self.record.sql = sql.or_else(|| self.fault.and_then(|f| f.sql.clone()));
        self
    }

    /// Append the backtrace to the detail, then compute the error hash
    #[must_use]
    pub fn with_full_stack_trace(mut self, backtrace: Option<String>) -> Self {
        let backtrace = backtrace.or_else(|| self.fault.and_then(|f| f.backtrace.clone()));
        if let Some(trace) = backtrace {
            let detail = self.record.detail.get_or_insert_with(String::new);
            detail.push_str(FULL_TRACE_SEPARATOR);
            detail.push_str(&trace);
        }
        self.record.refresh_error_hash();
        self
    }

    /// Type, source, message, detail, sql, full stack trace
    #[must_use]
    pub fn with_all_exception_properties(self) -> Self {
        self.with_type(None)
            .with_source(None)
            .with_message(None)
            .with_detail(None)
            .with_sql(None)
            .with_full_stack_trace(None)
    }

    /// Id of the record being built
    pub const fn record_id(&self) -> RecordId {
        self.record.id()
    }

    pub fn build(self) -> ErrorRecord {
        self.record
    }
}
