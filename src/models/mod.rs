//! Data models for the maintenance server

/// Store a string-backed enum as TEXT/VARCHAR in PostgreSQL.
///
/// The enum must provide `as_str()` and implement `FromStr<Err = String>`.
macro_rules! text_enum {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

pub mod device;
pub mod fault;
pub mod log;
pub mod report;
pub mod transfer;
pub mod user;

// Re-export commonly used types
pub use device::{CreateDevice, Device};
pub use fault::{AssignFault, CreateFault, EndRepair, FaultQuery, FaultRecord, FaultStatus, RepairCategory};
pub use log::LogEntry;
pub use transfer::{CreateTransfer, EquipmentTransfer, RejectTransfer, TransferQuery, TransferStatus};
pub use user::{Principal, Role, User, UserClaims};
