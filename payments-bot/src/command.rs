use anyhow::{Error, Result};
use indoc::indoc;

use crate::Data;

type Context<'a> = poise::Context<'a, Data, Error>;

pub const WELCOME: &str = indoc! {r#"
    Hi! Send me a JSON request to aggregate payments.

    Example request:
    ```json
    {
        "dt_from": "2022-09-01T00:00:00",
        "dt_upto": "2022-12-31T23:59:00",
        "group_type": "month"
    }
    ```
"#};

/// Explain how to ask for an aggregation.
#[poise::command(slash_command)]
pub async fn start(ctx: Context<'_>) -> Result<()> {
    ctx.say(WELCOME).await?;
    Ok(())
}
