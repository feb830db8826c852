//! Request record builder

use domain::{
    Claim, Cookies, FormFields, HeaderFilter, Headers, RecordId, RequestRecord, USERNAME_CLAIM,
};
use tracing::warn;

use super::missing_claim_resolver;
use crate::{
    application_info::ApplicationInfo,
    call_context::{CallContext, strip_query},
    error::ApplicationError,
    ports::ClaimResolver,
};

/// Builds a [`RequestRecord`] from an inbound call
///
/// Holds the call mutably so the body can be captured and handed back.
pub struct RequestRecordBuilder<'a> {
    record: RequestRecord,
    ctx: &'a mut CallContext,
    app: &'a ApplicationInfo,
    header_filter: &'a HeaderFilter,
    claim_resolver: Option<&'a dyn ClaimResolver>,
}

impl<'a> RequestRecordBuilder<'a> {
    pub fn new(
        ctx: &'a mut CallContext,
        app: &'a ApplicationInfo,
        header_filter: &'a HeaderFilter,
    ) -> Self {
        Self {
            record: RequestRecord::new(),
            ctx,
            app,
            header_filter,
            claim_resolver: None,
        }
    }

    /// Resolver used to derive claims and the username
    #[must_use]
    pub fn with_claim_resolver(mut self, resolver: &'a dyn ClaimResolver) -> Self {
        self.claim_resolver = Some(resolver);
        self
    }

    fn resolve_claims(&self) -> Result<Vec<Claim>, ApplicationError> {
        let resolver = self.claim_resolver.ok_or_else(missing_claim_resolver)?;
        Ok(resolver.claims(&*self.ctx))
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

    /// Claims from the resolver unless given
    ///
    /// # Errors
    /// [`ApplicationError::Configuration`] when deriving without a resolver
    pub fn with_claims(mut self, claims: Option<Vec<Claim>>) -> Result<Self, ApplicationError> {
        self.record.claims = match claims {
            Some(claims) => claims,
            None => self.resolve_claims()?,
        };
        Ok(self)
    }

    /// Username from the `username` claim unless given
    ///
    /// # Errors
    /// [`ApplicationError::Configuration`] when deriving without a resolver
    pub fn with_username(mut self, username: Option<String>) -> Result<Self, ApplicationError> {
        self.record.username = match username {
            Some(username) => Some(username),
            None => Claim::find(&self.resolve_claims()?, USERNAME_CLAIM).map(str::to_string),
        };
        Ok(self)
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: Option<Cookies>) -> Self {
        self.record.cookies = cookies.unwrap_or_else(|| self.ctx.cookies().clone());
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: Option<FormFields>) -> Self {
        self.record.form = form.unwrap_or_else(|| self.ctx.form().clone());
        self
    }

    /// Body text; deriving it reads the call body and restores it
    #[must_use]
    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.record.body = match body {
            Some(body) => Some(body),
            None => match self.ctx.body_mut().capture() {
                Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    warn!(error = %e, record_id = %self.record.id(), "Failed to read request body");
                    None
                },
            },
        };
        self
    }

    #[must_use]
    pub fn with_http_method(mut self, method: Option<String>) -> Self {
        self.record.http_method = Some(method.unwrap_or_else(|| self.ctx.method().to_string()));
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

    /// Request headers, after the header filter
    #[must_use]
    pub fn with_request_headers(mut self, headers: Option<Headers>) -> Self {
        let headers = headers.as_ref().unwrap_or_else(|| self.ctx.request_headers());
        self.record.request_headers = self.header_filter.filter(headers);
        self
    }

    /// Url with any query string removed
    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.record.url = Some(match url {
            Some(url) => strip_query(&url).to_string(),
            None => self.ctx.url_without_query(),
        });
        self
    }

    /// Id of the record being built
    pub const fn record_id(&self) -> RecordId {
        self.record.id()
    }

    pub fn build(self) -> RequestRecord {
        self.record
    }
}

impl std::fmt::Debug for RequestRecordBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRecordBuilder")
            .field("record", &self.record)
            .field("has_claim_resolver", &self.claim_resolver.is_some())
            .finish_non_exhaustive()
    }
}
