use crate::{UrlError, UrlResult};
use url::Url;

/// The immutable scheme + host (+ port) that bounds a clone run.
///
/// All discovered URLs must share this origin; cross-origin URLs are recorded
/// as external references but never enqueued as pages. Assets are exempt from
/// the boundary (they commonly live on CDNs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOrigin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl TargetOrigin {
    /// Parses an operator-supplied URL into a target origin.
    ///
    /// A bare hostname like `example.com` is accepted and treated as HTTPS,
    /// matching how the CLI lets operators omit the scheme.
    pub fn parse(input: &str) -> UrlResult<Self> {
        let trimmed = input.trim();
        // HTTPS is only assumed for inputs that carry no scheme at all; an
        // explicit non-HTTP(S) scheme must surface as InvalidScheme rather
        // than being reinterpreted as a host.
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .ok_or(UrlError::MissingHost)?
            .to_lowercase();

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port(),
        })
    }

    /// Returns true if the URL shares this origin.
    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url
                .host_str()
                .map(|h| h.eq_ignore_ascii_case(&self.host))
                .unwrap_or(false)
            && url.port() == self.port
    }

    /// The homepage URL for this origin (path `/`).
    pub fn homepage(&self) -> Url {
        // Constructed from validated components, so this cannot fail.
        Url::parse(&self.base()).expect("origin components always form a valid URL")
    }

    /// The origin as a string without a trailing slash, e.g. `https://example.com`.
    pub fn base(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// Resolves an origin-relative path (or checks an absolute URL) against
    /// this origin. Returns an error for absolute URLs on a different origin.
    pub fn resolve(&self, input: &str) -> UrlResult<Url> {
        let trimmed = input.trim();

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;
            if self.contains(&url) {
                Ok(url)
            } else {
                Err(UrlError::OutsideOrigin(trimmed.to_string()))
            }
        } else {
            let path = trimmed.strip_prefix('/').unwrap_or(trimmed);
            Url::parse(&format!("{}/{}", self.base(), path))
                .map_err(|e| UrlError::Parse(e.to_string()))
        }
    }

    /// The host with filesystem-unsafe characters replaced, used to name the
    /// default output directory `cloned_<sanitized-host>`.
    pub fn sanitized_host(&self) -> String {
        let mut name = self.host.replace('.', "_");
        if let Some(port) = self.port {
            name.push('_');
            name.push_str(&port.to_string());
        }
        name
    }

    /// Default output directory for this origin.
    pub fn default_output_dir(&self) -> String {
        format!("cloned_{}", self.sanitized_host())
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base())
    }
}
