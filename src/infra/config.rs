use std::path::PathBuf;

/// Every literal the migration depends on.
///
/// The tool takes no flags and reads no environment, so this is the one
/// place those literals live. Tests build variants with struct update syntax.
#[derive(Debug, Clone)]
pub struct RewriteConfig
{
    /// File read at the start of the pass
    pub input_path: PathBuf,

    /// File overwritten at the end of the pass
    pub output_path: PathBuf,

    /// Router object handlers are registered on
    pub router_ident: String,

    /// Leading indent a registration line must start with
    pub route_indent: usize,

    /// HTTP verbs recognised as handler registrations
    pub http_verbs: Vec<String>,

    /// Literal path marking the authentication handler
    pub login_marker: String,

    /// Login-handler lookup that must resolve the tenant itself
    pub login_lookup: String,

    /// Identifier of the storage dependency
    pub storage_ident: String,

    /// Identifier injected as the tenant argument
    pub tenant_ident: String,

    /// Request-scoped field the tenant is read from
    pub request_field: String,

    /// Extra indent of the injected declaration relative to the signature
    pub indent_step: usize,

    /// Fail instead of warning when a handler body never closes
    pub strict_unclosed: bool,
}

impl Default for RewriteConfig
{
    fn default() -> Self
    {
        Self {
            input_path: PathBuf::from("server/routes.ts"),
            output_path: PathBuf::from("server/routes.ts"),
            router_ident: "app".to_string(),
            route_indent: 2,
            http_verbs: ["get", "post", "put", "delete", "patch"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            login_marker: "\"/api/auth/login\"".to_string(),
            login_lookup: "getUserByUsername".to_string(),
            storage_ident: "storage".to_string(),
            tenant_ident: "tenantId".to_string(),
            request_field: "req.tenantId".to_string(),
            indent_step: 4,
            strict_unclosed: false,
        }
    }
}

impl RewriteConfig
{
    /// Marker a line must contain before any rule is tried
    pub fn awaited_call_marker(&self) -> String
    {
        format!("await {}.", self.storage_ident)
    }

    /// The declaration statement itself, without indent
    pub fn declaration_statement(&self) -> String
    {
        format!("const {} = {}!;", self.tenant_ident, self.request_field)
    }

    /// Declaration line injected at `indent` columns
    pub fn scoping_declaration(
        &self,
        indent: usize,
    ) -> String
    {
        format!("{}{}", " ".repeat(indent + self.indent_step), self.declaration_statement())
    }
}
