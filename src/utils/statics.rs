use std::{env, fs, sync::Arc};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref DISCORD_TOKEN: Arc<String> = Arc::new(
        fs::read_to_string(".discord_token")
            .or_else(|_| env::var("DISCORD_TOKEN"))
            .expect(
                "Discord token should be stored at .discord_token or DISCORD_TOKEN env variable"
            )
            .trim_end()
            .to_string()
    );
}
