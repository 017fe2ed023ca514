//! Conversions from infrastructure failures into transport errors.
//!
//! Everything the batcher sees crosses the `Transport` port as a
//! [`TransportError`], whose display text is written for end users.

use batchgate_common::CommonError;
use batchgate_domain::{TransportError, NETWORK_FAILURE_MESSAGE};
use reqwest::Error as HttpError;

use super::InfraError;

/// Extension trait making the mapping explicit at call sites and in tests.
pub trait IntoTransportError {
    fn into_transport(self) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self) -> TransportError {
        if self.is_builder() {
            return TransportError::Common(CommonError::config(format!(
                "request could not be built: {self}"
            )));
        }

        if self.is_decode() {
            return TransportError::InvalidResponse(format!("failed to read response body: {self}"));
        }

        // Connect, timeout and mid-request failures never produced a usable
        // response.
        TransportError::Network(NETWORK_FAILURE_MESSAGE.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* InfraError → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for InfraError {
    fn into_transport(self) -> TransportError {
        match self {
            InfraError::Http(err) => err.into_transport(),
            InfraError::Config(message) => TransportError::Common(CommonError::config(message)),
            InfraError::Common(err) => TransportError::Common(err),
        }
    }
}

impl From<InfraError> for TransportError {
    fn from(value: InfraError) -> Self {
        value.into_transport()
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
