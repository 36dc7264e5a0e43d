use http::Method;

/// Default content type applied when neither the client nor the method
/// declares one.
pub const APPLICATION_JSON: &str = "application/json";
/// Content type handled by the URL-encoded form body serializer.
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
/// Content type handled by the multipart body serializer.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Request channel a method parameter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Substituted into a `{placeholder}` of the path template
    PathVariable,
    /// Query-string parameter; the usual channel for GET and DELETE
    Query,
    /// Request-body entry; the default for every other method
    Body,
    /// Request header
    Header,
    /// Resolved at build time: GET/DELETE → Query, otherwise → Body.
    /// Never present in compiled metadata.
    Auto,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldKind::PathVariable => "PathVariable",
            FieldKind::Query => "Query",
            FieldKind::Body => "Body",
            FieldKind::Header => "Header",
            FieldKind::Auto => "Auto",
        };
        write!(f, "{s}")
    }
}

/// How the response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeMode {
    /// Deserialize the body directly as the declared response type
    Skip,
    /// Deserialize the body as the configured envelope, run its callback,
    /// then unwrap `data()`
    Decode,
}

/// Compiled description of one method parameter.
///
/// `json_format_able` governs flattening during template construction: a
/// flaggable complex value is converted to a map and merged entry-by-entry
/// into its destination channel instead of being stored under the field name.
/// The flag is meaningless for scalar values, so the accessor forces it off
/// whenever the declared type is scalar, regardless of what was requested.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    scalar: bool,
    json_format_able: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind, scalar: bool, json_format_able: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            scalar,
            json_format_able,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the declared parameter type is a scalar
    /// (integer/float/boolean/char/string).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.scalar
    }

    #[must_use]
    pub fn json_format_able(&self) -> bool {
        !self.scalar && self.json_format_able
    }
}

/// Compiled HTTP binding of one client method. Immutable once built.
///
/// Field descriptors live in one order-preserving master list — call-time
/// argument binding is positional, by index — and are simultaneously
/// partitioned into four classification buckets holding indices into that
/// list.
#[derive(Debug, Clone)]
pub struct EndpointMetadata {
    name: String,
    path: String,
    method: Method,
    content_type: String,
    envelope: EnvelopeMode,
    fields: Vec<FieldDescriptor>,
    path_variable_fields: Vec<usize>,
    query_fields: Vec<usize>,
    body_fields: Vec<usize>,
    header_fields: Vec<usize>,
}

impl EndpointMetadata {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        method: Method,
        content_type: impl Into<String>,
        envelope: EnvelopeMode,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            method,
            content_type: content_type.into(),
            envelope,
            fields: Vec::new(),
            path_variable_fields: Vec::new(),
            query_fields: Vec::new(),
            body_fields: Vec::new(),
            header_fields: Vec::new(),
        }
    }

    /// Append a descriptor to the master list and to its classification
    /// bucket. Descriptors must already be resolved — `Auto` is rejected.
    pub(crate) fn push_field(&mut self, field: FieldDescriptor) -> Result<(), crate::error::ClientError> {
        let index = self.fields.len();
        match field.kind() {
            FieldKind::PathVariable => self.path_variable_fields.push(index),
            FieldKind::Query => self.query_fields.push(index),
            FieldKind::Body => self.body_fields.push(index),
            FieldKind::Header => self.header_fields.push(index),
            FieldKind::Auto => {
                return Err(crate::error::ClientError::construction(format!(
                    "field '{}' of '{}' was not resolved from Auto",
                    field.name(),
                    self.name
                )))
            }
        }
        self.fields.push(field);
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn envelope(&self) -> EnvelopeMode {
        self.envelope
    }

    /// Ordered master list of field descriptors.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn path_variable_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.path_variable_fields.iter().map(|i| (*i, &self.fields[*i]))
    }

    #[must_use]
    pub fn query_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.query_fields.iter().map(|i| (*i, &self.fields[*i]))
    }

    #[must_use]
    pub fn body_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.body_fields.iter().map(|i| (*i, &self.fields[*i]))
    }

    #[must_use]
    pub fn header_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.header_fields.iter().map(|i| (*i, &self.fields[*i]))
    }

    /// Total descriptors across the four buckets; always equals
    /// `fields().len()`.
    #[must_use]
    pub fn bucketed_field_count(&self) -> usize {
        self.path_variable_fields.len()
            + self.query_fields.len()
            + self.body_fields.len()
            + self.header_fields.len()
    }
}
