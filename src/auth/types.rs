//! Types for authentication requests and responses

use serde::{Deserialize, Serialize};

use super::session::Role;

/// Body of `POST /api/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /api/forgetpassword`
#[derive(Debug, Clone, Serialize)]
pub struct ForgetPasswordRequest<'a> {
    pub email: &'a str,
}

/// Account details returned with a login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: serde_json::Value,
    pub email: Option<String>,
    pub nom: Option<String>,
    pub prenom: Option<String>,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The bearer token
    pub token: String,

    /// The account role
    pub role: Role,

    /// The user data, when the backend sends it
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// Where the app goes after a successful login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Homework list, for students and parents
    HomeworkList,
    /// Teacher workspace
    TeacherSpace,
    /// School management workspace
    DirectionSpace,
    /// Anything else
    Home,
}

impl From<&Role> for Route {
    fn from(role: &Role) -> Self {
        match role {
            Role::Parent | Role::Eleve => Route::HomeworkList,
            Role::Enseignant => Route::TeacherSpace,
            Role::Direction => Route::DirectionSpace,
            Role::Other(_) => Route::Home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_for_roles() {
        assert_eq!(Route::from(&Role::Eleve), Route::HomeworkList);
        assert_eq!(Route::from(&Role::Parent), Route::HomeworkList);
        assert_eq!(Route::from(&Role::Enseignant), Route::TeacherSpace);
        assert_eq!(Route::from(&Role::Direction), Route::DirectionSpace);
        assert_eq!(Route::from(&Role::from("admin")), Route::Home);
    }

    #[test]
    fn test_login_response_without_user() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"t1","role":"eleve"}"#).unwrap();
        assert_eq!(response.token, "t1");
        assert_eq!(response.role, Role::Eleve);
        assert!(response.user.is_none());
    }
}
