//! Forward resolution of ENS names.

use std::{
    fmt::{self, Debug},
    future::IntoFuture,
    time::Duration,
};

use alloy::{
    network::TransactionBuilder,
    primitives::{keccak256, Address, Bytes, B256},
    providers::{Provider, RootProvider},
    rpc::types::TransactionRequest,
    sol,
    sol_types::SolCall,
};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    constants::ENS_REGISTRY_ADDRESS,
    errors::{ChainClientError, ResolveError},
    evm::{http_provider, timed},
};

sol! {
    /// The ENS registry.
    interface IEnsRegistry {
        /// Resolver contract responsible for `node`.
        function resolver(bytes32 node) external view returns (address);
    }

    /// A public ENS resolver.
    interface IEnsResolver {
        /// Address `node` points at.
        function addr(bytes32 node) external view returns (address);
    }
}

/// Turns names into addresses.
#[async_trait]
pub trait NameResolver: Debug + Send + Sync {
    /// Resolves `name`, returning `None` when the name has no address record.
    async fn resolve(&self, name: &str) -> Result<Option<Address>, ResolveError>;
}

/// Computes the ENS namehash of a normalized `name`.
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }

    name.rsplit('.').fold(B256::ZERO, |node, label| {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        keccak256(buf)
    })
}

/// [`NameResolver`] that asks the ENS registry on an Ethereum node.
#[derive(Clone)]
pub struct EnsResolver {
    provider: RootProvider,
    registry: Address,
    timeout: Duration,
}

impl Debug for EnsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnsResolver")
            .field("registry", &self.registry)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EnsResolver {
    /// Creates a resolver against the canonical registry on the node at `rpc_url`.
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, ChainClientError> {
        Ok(Self {
            provider: http_provider(rpc_url)?,
            registry: ENS_REGISTRY_ADDRESS,
            timeout,
        })
    }

    /// Uses a registry other than the canonical one.
    pub fn with_registry(mut self, registry: Address) -> Self {
        self.registry = registry;
        self
    }

    async fn call(&self, to: Address, input: Vec<u8>) -> Result<Bytes, ChainClientError> {
        let request = TransactionRequest::default().with_to(to).with_input(input);

        timed("eth_call", self.timeout, self.provider.call(request).into_future()).await
    }
}

/// Decodes a single returned address, treating an empty return as "no record".
fn decode_address<C: SolCall>(
    raw: &[u8],
    extract: impl FnOnce(C::Return) -> Address,
) -> Result<Address, ChainClientError> {
    // calls to an address without code come back empty
    if raw.is_empty() {
        return Ok(Address::ZERO);
    }

    C::abi_decode_returns(raw, true)
        .map(extract)
        .map_err(|e| ChainClientError::Rpc {
            method: "eth_call",
            reason: format!("undecodable return data: {e}"),
        })
}

#[async_trait]
impl NameResolver for EnsResolver {
    async fn resolve(&self, name: &str) -> Result<Option<Address>, ResolveError> {
        let node = namehash(name);
        let fail = |cause| ResolveError {
            name: name.to_string(),
            cause,
        };

        let raw = self
            .call(self.registry, IEnsRegistry::resolverCall { node }.abi_encode())
            .await
            .map_err(fail)?;
        let resolver = decode_address::<IEnsRegistry::resolverCall>(&raw, |ret| ret._0)
            .map_err(fail)?;
        if resolver.is_zero() {
            debug!(%name, "name has no resolver");
            return Ok(None);
        }

        let raw = self
            .call(resolver, IEnsResolver::addrCall { node }.abi_encode())
            .await
            .map_err(fail)?;
        let address =
            decode_address::<IEnsResolver::addrCall>(&raw, |ret| ret._0).map_err(fail)?;
        if address.is_zero() {
            debug!(%name, %resolver, "name has no address record");
            return Ok(None);
        }

        debug!(%name, %address, "resolved name");
        Ok(Some(address))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::b256;

    use super::*;

    #[test]
    fn namehash_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            namehash("eth"),
            b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
        assert_eq!(
            namehash("foo.eth"),
            b256!("de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")
        );
    }

    #[test]
    fn empty_return_means_no_record() {
        assert_eq!(
            decode_address::<IEnsRegistry::resolverCall>(&[], |ret| ret._0),
            Ok(Address::ZERO)
        );

        let mut word = [0u8; 32];
        word[12..].copy_from_slice(Address::repeat_byte(7).as_slice());
        assert_eq!(
            decode_address::<IEnsResolver::addrCall>(&word, |ret| ret._0),
            Ok(Address::repeat_byte(7))
        );

        assert!(decode_address::<IEnsResolver::addrCall>(&[1, 2, 3], |ret| ret._0).is_err());
    }

    #[tokio::test]
    async fn unreachable_node_is_a_failure_not_a_miss() {
        let resolver = EnsResolver::new("http://127.0.0.1:1", Duration::from_secs(2))
            .expect("must accept a well-formed url");

        let err = resolver
            .resolve("vitalik.eth")
            .await
            .expect_err("must not treat an unreachable node as no record");
        assert_eq!(err.name, "vitalik.eth");
    }
}
