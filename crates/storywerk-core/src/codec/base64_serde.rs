// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// serde adapter storing byte blobs as standard, padded base64 strings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serializer};

use crate::layer::Blob;

pub fn serialize<S>(data: &Blob, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(data))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Blob, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map(Blob::from)
        .map_err(|err| Error::custom(format!("invalid base64 payload: {err}")))
}
