use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use evalya_smart::auth::{CredentialStore, FileStore, MemoryStore, Role, Route};
use evalya_smart::config::ClientOptions;
use evalya_smart::screens::{LoginScreen, PasswordRecoveryScreen, RECOVERY_SENT};
use evalya_smart::Evalya;

fn client(server: &MockServer, store: Arc<dyn CredentialStore>) -> Evalya {
    let options = ClientOptions::default().with_base_url(&server.uri());
    Evalya::with_store(options, store).unwrap()
}

#[tokio::test]
async fn test_login_persists_token_and_routes_student() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "email": "a@b.com", "password": "x" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "role": "eleve",
            "user": { "id": 3, "email": "a@b.com", "nom": "Diop", "prenom": "Awa" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let evalya = client(&mock_server, store.clone());
    let screen = LoginScreen::new(evalya.auth().clone());

    let route = screen.submit("a@b.com", "x").await;

    assert_eq!(route, Some(Route::HomeworkList));
    assert!(screen.error().is_none());
    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(saved.token, "t1");
    assert_eq!(saved.role, Role::Eleve);
}

#[tokio::test]
async fn test_login_failures_map_to_messages_and_persist_nothing() {
    for (status, expected) in [
        (401, "Mot de passe incorrect"),
        (404, "Utilisateur introuvable"),
        (500, "Erreur de connexion au serveur"),
    ] {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "message": "nope" })))
            .mount(&mock_server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let evalya = client(&mock_server, store.clone());
        let screen = LoginScreen::new(evalya.auth().clone());

        assert_eq!(screen.submit("a@b.com", "x").await, None);
        assert_eq!(screen.error().as_deref(), Some(expected));
        assert!(!screen.is_loading());
        assert!(store.load().await.unwrap().is_none());
        assert!(evalya.auth().get_session().is_none());
    }
}

#[tokio::test]
async fn test_login_validation_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let evalya = client(&mock_server, Arc::new(MemoryStore::new()));
    let screen = LoginScreen::new(evalya.auth().clone());

    assert_eq!(screen.submit("", "x").await, None);
    assert_eq!(screen.error().as_deref(), Some("Veuillez remplir tous les champs"));

    assert_eq!(screen.submit("pas-un-email", "x").await, None);
    assert_eq!(screen.error().as_deref(), Some("Veuillez entrer un email valide"));

    screen.on_edit();
    assert!(screen.error().is_none());
}

#[tokio::test]
async fn test_teacher_role_routes_to_teacher_space() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t2",
            "role": "enseignant"
        })))
        .mount(&mock_server)
        .await;

    let evalya = client(&mock_server, Arc::new(MemoryStore::new()));
    let screen = LoginScreen::new(evalya.auth().clone());

    assert_eq!(screen.submit("prof@ecole.sn", "x").await, Some(Route::TeacherSpace));
}

#[tokio::test]
async fn test_session_survives_restart_with_file_store() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t3",
            "role": "surveillant"
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let credentials = dir.path().join("credentials.json");

    let first = client(&mock_server, Arc::new(FileStore::new(&credentials)));
    first.auth().login("a@b.com", "x").await.unwrap();

    let second = client(&mock_server, Arc::new(FileStore::new(&credentials)));
    let session = second.auth().restore_session().await.unwrap().unwrap();
    assert_eq!(session.token, "t3");
    assert_eq!(session.role, Role::Other("surveillant".to_string()));

    second.auth().logout().await.unwrap();
    assert!(second.auth().token().await.unwrap().is_none());
    assert!(!credentials.exists());
}

#[tokio::test]
async fn test_password_recovery_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/forgetpassword"))
        .and(body_json(json!({ "email": "a@b.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let evalya = client(&mock_server, Arc::new(MemoryStore::new()));
    let screen = PasswordRecoveryScreen::new(evalya.auth().clone());

    assert!(screen.submit("a@b.com").await);
    assert_eq!(screen.message().as_deref(), Some(RECOVERY_SENT));
    assert!(screen.error().is_none());
}

#[tokio::test]
async fn test_password_recovery_failures() {
    let cases = [
        (ResponseTemplate::new(201), "Erreur inattendue (statut : 201)"),
        (ResponseTemplate::new(404), "Adresse email non trouvée."),
        (
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Email requis" })),
            "Email requis",
        ),
        (
            ResponseTemplate::new(503).set_body_json(json!({ "message": "Service indisponible" })),
            "Erreur 503 : Service indisponible",
        ),
    ];

    for (response, expected) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/forgetpassword"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        let evalya = client(&mock_server, Arc::new(MemoryStore::new()));
        let screen = PasswordRecoveryScreen::new(evalya.auth().clone());

        assert!(!screen.submit("a@b.com").await);
        assert_eq!(screen.error().as_deref(), Some(expected));
        assert!(screen.message().is_none());
    }
}

#[tokio::test]
async fn test_password_recovery_without_server() {
    let options = ClientOptions::default().with_base_url("http://127.0.0.1:9");
    let evalya = Evalya::with_store(options, Arc::new(MemoryStore::new())).unwrap();
    let screen = PasswordRecoveryScreen::new(evalya.auth().clone());

    assert!(!screen.submit("a@b.com").await);
    assert_eq!(
        screen.error().as_deref(),
        Some("Aucune réponse du serveur. Vérifiez votre connexion internet.")
    );

    assert!(!screen.submit("").await);
    assert_eq!(screen.error().as_deref(), Some("Veuillez entrer un email"));
}

#[tokio::test]
async fn test_abandoned_login_leaves_form_usable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "slow", "role": "eleve" }))
                .set_delay(Duration::from_secs(5)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t1", "role": "eleve" })))
        .mount(&mock_server)
        .await;

    let evalya = client(&mock_server, Arc::new(MemoryStore::new()));
    let screen = LoginScreen::new(evalya.auth().clone());

    let abandoned = tokio::time::timeout(Duration::from_millis(100), screen.submit("a@b.com", "x")).await;
    assert!(abandoned.is_err());
    assert!(!screen.is_loading());

    assert_eq!(screen.submit("a@b.com", "x").await, Some(Route::HomeworkList));
}

#[tokio::test]
async fn test_abandoned_recovery_leaves_form_usable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/forgetpassword"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/forgetpassword"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let evalya = client(&mock_server, Arc::new(MemoryStore::new()));
    let screen = PasswordRecoveryScreen::new(evalya.auth().clone());

    let abandoned = tokio::time::timeout(Duration::from_millis(100), screen.submit("a@b.com")).await;
    assert!(abandoned.is_err());
    assert!(!screen.is_loading());

    assert!(screen.submit("a@b.com").await);
}
