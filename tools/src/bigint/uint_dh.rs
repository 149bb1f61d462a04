use crypto_bigint::{
    modular::runtime_mod::{DynResidue, DynResidueParams},
    NonZero, RandomMod, Uint,
};
use rand_core::CryptoRngCore;

/// Dynamic Parameters for Diffie-Hellmann Key Exchange
#[derive(Clone, Copy, Debug)]
pub struct DiffieHellmannParams<const LIMBS: usize> {
    p: DynResidueParams<LIMBS>,
    g: DynResidue<LIMBS>,
}

impl<const LIMBS: usize> DiffieHellmannParams<LIMBS> {
    /// Generates new dynamic Diffie-Hellmann Parameters from the given Bignums.
    /// The modulus must be odd.
    pub const fn new(p: &Uint<LIMBS>, g: Uint<LIMBS>) -> Self {
        let param = DynResidueParams::new(p);
        let g_mod = DynResidue::new(&g, param);
        Self { p: param, g: g_mod }
    }

    pub fn modulus(&self) -> &Uint<LIMBS> {
        self.p.modulus()
    }
}

/// DiffieHellman Instance for Dynamic Parameters
pub struct DynDiffieHellmannInstance<const LIMBS: usize> {
    params: DiffieHellmannParams<LIMBS>,
    private_key: Uint<LIMBS>,
    public_key: DynResidue<LIMBS>,
}

impl<const LIMBS: usize> DynDiffieHellmannInstance<LIMBS> {
    /// From RNG output generates a new Diffie-Hellmann Instance with a private key in [0, p)
    pub fn new(params: &DiffieHellmannParams<LIMBS>, rng: &mut impl CryptoRngCore) -> Self {
        let a = Uint::random_mod(rng, &NonZero::from_uint(*params.modulus()));

        Self {
            params: *params,
            private_key: a,
            public_key: params.g.pow(&a),
        }
    }

    /// Returns the public key of the Diffie-Hellmann Instance
    pub fn get_public_key(&self) -> Uint<LIMBS> {
        self.public_key.retrieve()
    }

    /// Shared secret with the holder of the given public key
    pub fn shared_secret(&self, other: &Uint<LIMBS>) -> Uint<LIMBS> {
        DynResidue::new(other, self.params.p)
            .pow(&self.private_key)
            .retrieve()
    }
}

#[test]
fn test_shared_secret_agrees() {
    use crypto_bigint::U64;
    use rand::thread_rng;

    let params = DiffieHellmannParams::new(&U64::from_u32(37), U64::from_u32(5));
    let mut rng = thread_rng();

    for _ in 0..32 {
        let alice = DynDiffieHellmannInstance::new(&params, &mut rng);
        let bob = DynDiffieHellmannInstance::new(&params, &mut rng);

        let a = alice.get_public_key();
        let b = bob.get_public_key();

        assert!(a < U64::from_u32(37));
        assert_eq!(alice.shared_secret(&b), bob.shared_secret(&a));
    }
}
