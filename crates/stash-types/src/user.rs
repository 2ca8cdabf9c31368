//! User types

use serde::{Deserialize, Serialize};

/// A user row as stored in the record store and snapshotted into the cache.
///
/// `id` is assigned by the store on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userid")]
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub location: String,
}

/// User creation request. Any `userid` in the body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
    pub location: String,
}

impl NewUser {
    /// Attach the identifier the store generated for this user
    pub fn with_id(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            age: self.age,
            location: self.location,
        }
    }
}

/// Response to a successful insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertResponse {
    pub id: i64,
    pub message: String,
}

impl InsertResponse {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            message: format!("User {} has been inserted", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_field_names() {
        let user = User {
            id: 7,
            name: "Alice".to_string(),
            age: 30,
            location: "NYC".to_string(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["userid"], 7);
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["age"], 30);
        assert_eq!(value["location"], "NYC");
    }

    #[test]
    fn test_user_snapshot_is_lossless() {
        let users = [
            User {
                id: 0,
                name: String::new(),
                age: 0,
                location: String::new(),
            },
            User {
                id: i64::MAX,
                name: "Zoë \"Z\" O'Neil".to_string(),
                age: -1,
                location: "São Paulo\n".to_string(),
            },
            User {
                id: 42,
                name: "Bob".to_string(),
                age: i64::MIN,
                location: "LA".to_string(),
            },
        ];

        for user in users {
            let bytes = serde_json::to_vec(&user).unwrap();
            let decoded: User = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decoded, user);
        }
    }

    #[test]
    fn test_new_user_ignores_userid() {
        let body = r#"{"userid": 99, "name": "Alice", "age": 30, "location": "NYC"}"#;
        let new_user: NewUser = serde_json::from_str(body).unwrap();
        let user = new_user.with_id(7);
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn test_insert_response_message() {
        let res = InsertResponse::new(7, "Alice");
        assert_eq!(res.id, 7);
        assert_eq!(res.message, "User Alice has been inserted");
    }
}
