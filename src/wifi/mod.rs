//! Wi-Fi credential sharing: the `WIFI:` URI format and the OS profile store.

pub mod profiles;
pub mod uri;

pub use profiles::{open_store, share_credentials, WifiBackend, WifiProfile, WifiProfileStore};
pub use uri::{is_wifi_uri, parse_wifi_uri, Security, WifiCredentials};
