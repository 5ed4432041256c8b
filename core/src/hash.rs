// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Hash related utils.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use md5::Md5;
use sha2::Digest;
use sha2::Sha256;

/// Base64 encode
///
/// The standard alphabet with padding never produces whitespace, so the
/// output needs no trimming.
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    h.finalize().into_bytes().to_vec()
}

/// Base64 encoded HMAC with SHA256 hash.
pub fn base64_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    base64_encode(&hmac_sha256(key, content))
}

/// Base64 encoded MD5 hash.
///
/// Used for the `Content-MD5` transfer checksum of request bodies. This is an
/// integrity check required by the protocol, not a security primitive.
pub fn base64_md5(content: &[u8]) -> String {
    base64_encode(Md5::digest(content).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_md5() {
        assert_eq!(base64_md5(b"foo"), "rL0Y20zC+Fzt72VPzMSk2A==");
        assert_eq!(base64_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[test]
    fn test_hmac_sha256_known_vector() {
        // RFC 4231, test case 2.
        let key = b"Jefe";
        let content = b"what do ya want for nothing?";

        let raw = hmac_sha256(key, content);
        assert_eq!(raw.len(), 32);
        assert_eq!(raw[..4], [0x5b, 0xdc, 0xc1, 0x46]);
        assert_eq!(
            base64_hmac_sha256(key, content),
            "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM="
        );
    }

    #[test]
    fn test_base64_hmac_sha256_is_deterministic() {
        let a = base64_hmac_sha256(b"secret", b"message");
        let b = base64_hmac_sha256(b"secret", b"message");
        assert_eq!(a, b);
        assert_ne!(a, base64_hmac_sha256(b"secret2", b"message"));
    }
}
