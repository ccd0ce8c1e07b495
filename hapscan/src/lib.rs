#![allow(
    clippy::too_many_arguments,
    clippy::new_without_default,
    clippy::uninlined_format_args,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::float_cmp,
    clippy::needless_pass_by_value
)]

// HAPSCAN - Windowed haplotype structure scans
// Copyright (C) 2024  Osma S. Rautila
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

pub mod libs;
pub use libs::{
    args, branch_stats, cluster, emitter, error, hapcount, io, matrix, merge_tree, read_vcf, utils,
    windows,
};

#[cfg(feature = "clap")]
pub use libs::clap;

/// HAPSCAN commands
pub mod subcommands;
