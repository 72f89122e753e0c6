#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::ClientConfig;
    use crate::errors::{ ErrorReport, RegistryError };
    use crate::implementations::client::RegistryClient;
    use crate::implementations::listing::ListFilter;
    use crate::implementations::route_guard::{ Navigation, Route };
    use crate::implementations::session_store::SessionStore;
    use crate::implementations::storage::FileStore;
    use crate::models::common::{ PropertyType, VerificationStatus };
    use crate::models::user::{ Credentials, ProfileUpdate };
    use crate::tests::support::{ session, setup, FakeBackend, VALID_PASSWORD };

    fn client(backend: &Arc<FakeBackend>) -> RegistryClient {
        let session = session();
        backend.attach_session(session.clone());
        RegistryClient::with_backend(ClientConfig::default(), session, backend.clone())
    }

    #[tokio::test]
    async fn login_opens_protected_views() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);

        assert_eq!(
            client.guard().resolve(Route::Dashboard),
            Navigation::Redirect { to: Route::Login, from: Route::Dashboard }
        );
        assert_eq!(client.guard().resolve(Route::Register), Navigation::Render(Route::Register));

        let user = client.login(&Credentials::new("ada@example.com", VALID_PASSWORD)).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(client.session().token().as_deref(), Some("token-123"));
        assert_eq!(client.guard().resolve(Route::Dashboard), Navigation::Render(Route::Dashboard));

        client.logout();
        assert!(!client.session().is_authenticated());
        assert!(matches!(client.guard().resolve(Route::Profile), Navigation::Redirect { .. }));
    }

    #[tokio::test]
    async fn wrong_password_keeps_server_message() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);

        let err = client.login(&Credentials::new("ada@example.com", "wrong-pass")).await.unwrap_err();
        assert_eq!(ErrorReport::from(&err).message, "Invalid credentials");
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn malformed_credentials_never_reach_the_server() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);

        let err = client.login(&Credentials::new("not-an-email", "123")).await.unwrap_err();
        let fields = err.field_errors().cloned().unwrap_or_default();
        assert_eq!(fields.get("email"), Some("Invalid email address"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn session_survives_restart() {
        setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let backend = FakeBackend::shared();

        let first = SessionStore::open(Arc::new(FileStore::new(path.clone())));
        first.login(backend.as_ref(), &Credentials::new("ada@example.com", VALID_PASSWORD)).await.unwrap();

        let restored = SessionStore::open(Arc::new(FileStore::new(path)));
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().map(|u| u.id), Some("u-owner".to_string()));
    }

    #[tokio::test]
    async fn profile_update_refreshes_stored_user() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);
        client.login(&Credentials::new("ada@example.com", VALID_PASSWORD)).await.unwrap();

        let update = ProfileUpdate {
            first_name: "Adama".into(),
            last_name: "Kamara".into(),
            email: "adama@example.com".into(),
            phone_number: Some("  ".into()),
        };
        let user = client.update_profile(&update).await.unwrap();
        assert_eq!(user.first_name, "Adama");
        assert_eq!(client.session().user().map(|u| u.email), Some("adama@example.com".to_string()));
        assert_eq!(client.session().token().as_deref(), Some("token-123"));
    }

    #[tokio::test]
    async fn expired_token_clears_the_session() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);
        client.login(&Credentials::new("ada@example.com", VALID_PASSWORD)).await.unwrap();

        backend.fail_next("dashboard_trends", RegistryError::Unauthorized);
        let err = client.dashboard().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!client.session().is_authenticated());
        assert_eq!(
            client.guard().after_failure(Route::Dashboard, &err),
            Some(Navigation::Redirect { to: Route::Login, from: Route::Dashboard })
        );
    }

    #[tokio::test]
    async fn other_failures_do_not_navigate() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);
        client.login(&Credentials::new("ada@example.com", VALID_PASSWORD)).await.unwrap();

        let dashboard = client.dashboard().await.unwrap();
        assert_eq!(dashboard.stats.total_properties, 3);
        assert_eq!(dashboard.trends.len(), 1);

        let err = client.property("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Property not found");
        assert_eq!(client.guard().after_failure(Route::PropertyDetail("missing".into()), &err), None);
        assert!(client.session().is_authenticated());
    }

    #[tokio::test]
    async fn list_filters_locally() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);

        let mut list = client.properties().await.unwrap();
        assert_eq!(list.visible().len(), 3);

        list.set_filter(ListFilter { status: None, property_type: Some(PropertyType::Residential) });
        let ids: Vec<&str> = list.visible().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);

        list.set_filter(ListFilter {
            status: Some(VerificationStatus::Verified),
            property_type: Some(PropertyType::Residential),
        });
        assert_eq!(list.visible().len(), 1);
        assert_eq!(list.all().len(), 3);
        assert_eq!(backend.count("list_properties"), 1);
    }

    #[tokio::test]
    async fn forgot_password_validates_email_first() {
        setup();
        let backend = FakeBackend::shared();
        let client = client(&backend);

        let err = client.forgot_password("nobody").await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert!(backend.calls().is_empty());

        client.forgot_password("ada@example.com").await.unwrap();
        assert_eq!(backend.calls(), vec!["forgot_password:ada@example.com".to_string()]);
    }
}
