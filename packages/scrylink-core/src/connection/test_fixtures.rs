//! Shared test fixtures for connection tests.
//!
//! Canned server payloads used by multiple test modules to avoid duplication.

/// Root resource body of a healthy server.
pub const ROOT_CONTAINER_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ServerContainer serverId="a1f8c2d6e9b44710" name="den" version="0.9.12" claimed="1">
  <Capability id="library" />
  <Capability id="timeline" />
</ServerContainer>"#;

/// Root resource body of something that answers HTTP but is not a server
/// (a router landing page, for instance).
pub const ROOT_NOT_A_SERVER: &str = "<html><body>admin console</body></html>";
