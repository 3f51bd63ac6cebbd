use crate::locale::Catalog;
use crate::validator::Errors;
use std::borrow::Cow;
use std::sync::Arc;

/// Renders violation codes of one model into human-readable messages.
///
/// Lookup order for a code is `<scope>.<code>` for the model itself and then each of
/// its ancestors (nearest first), followed by the bare `<code>`. Templates may use
/// `%{model}` and `%{code}`. Codes without any entry render as `"<model>: <code>"`.
#[derive(Debug)]
pub struct Policy {
    model: Cow<'static, str>,
    ancestors: Vec<Cow<'static, str>>,
    catalog: Arc<Catalog>,
}

impl Policy {
    pub(crate) const fn new(
        model: Cow<'static, str>,
        ancestors: Vec<Cow<'static, str>>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self { model, ancestors, catalog }
    }

    /// Name of the model this policy belongs to, equal to [`Model::name`](crate::Model::name).
    ///
    /// A name rather than a handle: the policy is cached inside the model itself.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Scopes searched for messages, most specific first.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.model.as_ref()).chain(self.ancestors.iter().map(AsRef::as_ref))
    }

    #[must_use]
    pub fn message(&self, code: &str) -> String {
        let template = self
            .scopes()
            .find_map(|scope| self.catalog.get(&format!("{scope}.{code}")))
            .or_else(|| self.catalog.get(code));

        template.map_or_else(
            || format!("{}: {code}", self.model),
            |template| template.replace("%{model}", &self.model).replace("%{code}", code),
        )
    }

    #[must_use]
    pub fn messages(&self, errors: &Errors) -> Vec<String> {
        errors.iter().map(|code| self.message(code)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(catalog: Catalog) -> Policy {
        Policy::new("Github.repos".into(), vec!["Github".into()], Arc::new(catalog))
    }

    #[test]
    fn most_specific_scope_wins() {
        let policy = policy(
            Catalog::new()
                .with("Github.repos.name_present", "Repository needs a name")
                .with("Github.name_present", "Client needs a name")
                .with("name_present", "Name is required"),
        );
        assert_eq!(policy.message("name_present"), "Repository needs a name");
    }

    #[test]
    fn falls_back_to_ancestors_then_bare_code() {
        let policy = policy(
            Catalog::new()
                .with("Github.token_present", "Token is required")
                .with("email_format", "Email of %{model} is malformed (%{code})"),
        );
        assert_eq!(policy.message("token_present"), "Token is required");
        assert_eq!(
            policy.message("email_format"),
            "Email of Github.repos is malformed (email_format)"
        );
        assert_eq!(policy.message("unknown_code"), "Github.repos: unknown_code");
    }

    #[test]
    fn scopes_start_with_the_model() {
        let policy = policy(Catalog::new());
        assert_eq!(policy.model(), "Github.repos");
        assert_eq!(policy.scopes().collect::<Vec<_>>(), vec!["Github.repos", "Github"]);
    }
}
