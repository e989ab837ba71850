//! `sign <email> [--verify <hex>]`.

use cw_domain::config::Config;
use cw_widget::signing::{identifier_hash, verify_identifier_hash};

use crate::bootstrap::open_settings;

/// Print the digest, or check one.  Returns `false` on a failed check.
pub fn run(config: &Config, email: &str, verify: Option<&str>) -> anyhow::Result<bool> {
    let settings = open_settings(config)?.snapshot();
    if !settings.has_identity_secret() {
        anyhow::bail!(
            "no HMAC secret configured (set chatwoot_hmac_token or ${})",
            config.chatwoot.hmac_token_env
        );
    }
    let email = email.trim();

    match verify {
        Some(digest) => {
            let ok = verify_identifier_hash(&settings.hmac_token, email, digest);
            println!("{}", if ok { "valid" } else { "invalid" });
            Ok(ok)
        }
        None => {
            let digest = identifier_hash(&settings.hmac_token, email)
                .ok_or_else(|| anyhow::anyhow!("empty HMAC secret"))?;
            println!("{digest}");
            Ok(true)
        }
    }
}
