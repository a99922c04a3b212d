pub mod payment_manager;
pub mod registration_manager;
pub mod verification_manager;

pub use payment_manager::{create_shared_payment_manager, SharedPaymentManager};
pub use registration_manager::{
    create_shared_registration_manager, RegisterOutcome, SharedRegistrationManager,
};
pub use verification_manager::{create_shared_verification_manager, SharedVerificationManager};
