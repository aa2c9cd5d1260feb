//! CLI subcommand implementations.

pub mod quote;
pub mod watch;

use tickr_lib::AssetKind;

pub(crate) fn asset_kind(crypto: bool) -> AssetKind {
    if crypto {
        AssetKind::Crypto
    } else {
        AssetKind::Stock
    }
}
