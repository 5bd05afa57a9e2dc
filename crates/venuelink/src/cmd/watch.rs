use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use venuelink_client::ClientError;
use venuelink_net::NetError;

use crate::cmd::WatchArgs;
use crate::exit::{client_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut client = args.session.open_session()?;

    while running.load(Ordering::SeqCst) {
        match client.receive_downstream(POLL_INTERVAL) {
            Ok(msg) => print_message(&msg, format),
            // Nothing arrived within the poll interval; check for Ctrl-C.
            Err(ClientError::Net(NetError::Timeout { collected: 0, .. })) => continue,
            Err(ClientError::Net(NetError::ConnectionClosed { collected: 0, .. })) => {
                info!("venue closed the downstream channel");
                break;
            }
            Err(err) => return Err(client_error("receive failed", err)),
        }
    }

    client.close();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("failed to install signal handler: {err}")))
}
