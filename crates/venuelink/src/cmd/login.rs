use crate::cmd::LoginArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_session, OutputFormat};

pub fn run(args: LoginArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.session.config()?;
    let mut client = args.session.open_session()?;

    print_session(
        &args.session.name,
        config.upstream_addr().to_string(),
        config.downstream_addr().to_string(),
        client.token().is_some(),
        format,
    );

    client.close();
    Ok(SUCCESS)
}
