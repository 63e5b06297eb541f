//! Value objects for the sync domain.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Number of digits in a room id.
pub const ROOM_ID_LEN: usize = 8;

/// Maximum length of a client id.
pub const CLIENT_ID_MAX_LEN: usize = 64;

/// Room identifier: exactly 8 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Create a RoomId, validating the 8-digit format.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.len() != ROOM_ID_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueObjectError::InvalidRoomId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Random room id generator.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Smallest and largest generated ids; the first digit is never zero.
    pub const MIN: u32 = 10_000_000;
    pub const MAX: u32 = 99_999_999;

    /// Draw a uniformly random 8-digit room id.
    pub fn generate() -> RoomId {
        let value = rand::thread_rng().gen_range(Self::MIN..=Self::MAX);
        RoomId(value.to_string())
    }
}

/// Client identifier announced by the client in `hello` / `action` frames.
///
/// Only used for tracing; room membership is tracked by [`ConnectionId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() || value.chars().count() > CLIENT_ID_MAX_LEN {
            return Err(ValueObjectError::InvalidClientId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Server-assigned identity of one socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_factory_generates_valid_ids() {
        // テスト項目: 生成されたルーム ID は常に 8 桁で先頭が 0 にならない
        // given (前提条件) / when (操作):
        let ids: Vec<RoomId> = (0..200).map(|_| RoomIdFactory::generate()).collect();

        // then (期待する結果):
        for id in ids {
            assert!(RoomId::new(id.as_str().to_string()).is_ok());
            assert!(!id.as_str().starts_with('0'));
        }
    }

    #[test]
    fn test_room_id_accepts_eight_digits() {
        // テスト項目: 8 桁の数字はルーム ID として受け入れられる
        // given (前提条件):
        let value = "12345678".to_string();

        // when (操作):
        let result = RoomId::new(value);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "12345678");
    }

    #[test]
    fn test_room_id_rejects_wrong_length() {
        // テスト項目: 8 桁以外の長さは拒否される
        // given (前提条件):
        let too_short = "1234567".to_string();
        let too_long = "123456789".to_string();

        // when (操作):
        let short_result = RoomId::new(too_short);
        let long_result = RoomId::new(too_long);

        // then (期待する結果):
        assert!(matches!(short_result, Err(ValueObjectError::InvalidRoomId(_))));
        assert!(matches!(long_result, Err(ValueObjectError::InvalidRoomId(_))));
    }

    #[test]
    fn test_room_id_rejects_non_digits() {
        // テスト項目: 数字以外を含む ID は拒否される（全角数字も含む）
        // given (前提条件):
        let cases = ["1234abcd", "1234 678", "-1234567", "１２３４５６７８", ""];

        for case in cases {
            // when (操作):
            let result = RoomId::try_from(case.to_string());

            // then (期待する結果):
            assert!(result.is_err(), "{:?} should be rejected", case);
        }
    }

    #[test]
    fn test_room_id_deserialize_validates() {
        // テスト項目: デシリアライズ時にもフォーマットが検証される
        // given (前提条件):
        let valid = "\"00000042\"";
        let invalid = "\"42\"";

        // when (操作):
        let valid_result = serde_json::from_str::<RoomId>(valid);
        let invalid_result = serde_json::from_str::<RoomId>(invalid);

        // then (期待する結果):
        assert_eq!(valid_result.unwrap().as_str(), "00000042");
        assert!(invalid_result.is_err());
    }

    #[test]
    fn test_client_id_length_limits() {
        // テスト項目: 空文字と上限超過のクライアント ID は拒否される
        // given (前提条件):
        let empty = String::new();
        let max = "a".repeat(CLIENT_ID_MAX_LEN);
        let over = "a".repeat(CLIENT_ID_MAX_LEN + 1);

        // when (操作) / then (期待する結果):
        assert!(ClientId::new(empty).is_err());
        assert!(ClientId::new(max).is_ok());
        assert!(ClientId::new(over).is_err());
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 生成される接続 ID は毎回異なる
        // given (前提条件) / when (操作):
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }
}
