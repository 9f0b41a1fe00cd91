use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Account role. Creators own recipes and the catalog; viewers browse,
/// favourite and rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Creator,
    Viewer,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Creator => "creator",
            UserType::Viewer => "viewer",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creator" => Ok(UserType::Creator),
            "viewer" => Ok(UserType::Viewer),
            other => Err(format!("\"{}\" is not a valid choice.", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_round_trips_through_str() {
        for user_type in [UserType::Creator, UserType::Viewer] {
            assert_eq!(user_type.as_str().parse::<UserType>(), Ok(user_type));
        }
    }

    #[test]
    fn test_unknown_user_type_is_rejected() {
        assert_eq!(
            "admin".parse::<UserType>(),
            Err("\"admin\" is not a valid choice.".to_string())
        );
    }
}
