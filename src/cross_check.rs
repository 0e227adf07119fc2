//! Cross-check tests against a fixed-width FF3-1 reference.
//!
//! The reference below keeps every half in a `u128`, which bounds it to
//! domains where `radix^ceil(n/2) <= 2^96`. Inside those bounds it must agree
//! with the arbitrary-precision engine digit for digit.

#[cfg(test)]
mod tests {
    use aes::cipher::{Array, BlockCipherEncrypt, KeyInit};
    use aes::{Aes128, Aes192, Aes256};

    use crate::alphabet::Alphabet;
    use crate::ff3::Ff3Cipher;

    fn aes_block(key: &[u8], input: [u8; 16]) -> [u8; 16] {
        let reversed: Vec<u8> = key.iter().rev().copied().collect();
        let mut block = Array::from(input);
        match key.len() {
            16 => Aes128::new_from_slice(&reversed).unwrap().encrypt_block(&mut block),
            24 => Aes192::new_from_slice(&reversed).unwrap().encrypt_block(&mut block),
            32 => Aes256::new_from_slice(&reversed).unwrap().encrypt_block(&mut block),
            len => panic!("unsupported key length {}", len),
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(block.as_slice());
        out
    }

    fn num_rev(x: &[u32], radix: u32) -> u128 {
        x.iter()
            .rev()
            .fold(0u128, |acc, &d| acc * radix as u128 + d as u128)
    }

    fn str_rev(mut value: u128, radix: u32, len: usize) -> Vec<u32> {
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push((value % radix as u128) as u32);
            value /= radix as u128;
        }
        out
    }

    fn reference(key: &[u8], tweak: &[u8; 7], radix: u32, x: &[u32], encrypt: bool) -> Vec<u32> {
        let n = x.len();
        let u = n.div_ceil(2);
        let v = n - u;
        let t_l = [tweak[0], tweak[1], tweak[2], tweak[3] & 0xf0];
        let t_r = [tweak[4], tweak[5], tweak[6], (tweak[3] & 0x0f) << 4];

        let y = |round: usize, half: &[u32]| {
            let w = if round % 2 == 0 { t_r } else { t_l };
            let mut p = [0u8; 16];
            p[..4].copy_from_slice(&w);
            p[3] ^= round as u8;
            p[4..].copy_from_slice(&num_rev(half, radix).to_be_bytes()[4..]);
            p.reverse();
            let mut s = aes_block(key, p);
            s.reverse();
            u128::from_be_bytes(s)
        };
        let params = |round: usize| {
            let m = if round % 2 == 0 { u } else { v };
            (m, (radix as u128).pow(m as u32))
        };

        let mut a = x[..u].to_vec();
        let mut b = x[u..].to_vec();
        if encrypt {
            for round in 0..8 {
                let (m, modulus) = params(round);
                let c = (num_rev(&a, radix) + y(round, &b) % modulus) % modulus;
                a = b;
                b = str_rev(c, radix, m);
            }
        } else {
            for round in (0..8).rev() {
                let (m, modulus) = params(round);
                let c = (num_rev(&b, radix) + modulus - y(round, &a) % modulus) % modulus;
                b = a;
                a = str_rev(c, radix, m);
            }
        }
        a.extend(b);
        a
    }

    fn sample(radix: u32, len: usize, seed: u32) -> Vec<u32> {
        (0..len as u32)
            .map(|i| (i.wrapping_mul(2_654_435_761).wrapping_add(seed) >> 7) % radix)
            .collect()
    }

    fn check(alphabet: Alphabet, key: &[u8], tweak: &[u8; 7]) {
        let radix = alphabet.radix();
        let cipher = Ff3Cipher::new(key, tweak).unwrap().with_alphabet(alphabet);
        let (min, max) = (cipher.alphabet().min_length(), cipher.alphabet().max_length());
        for len in [min, min + 1, (min + max) / 2, max - 1, max] {
            let pt = sample(radix, len, len as u32);
            let ct = cipher.encrypt_numerals(&pt).unwrap();
            assert_eq!(ct, reference(key, tweak, radix, &pt, true), "radix {} len {}", radix, len);
            assert_eq!(reference(key, tweak, radix, &ct, false), pt);
            assert_eq!(cipher.decrypt_numerals(&ct).unwrap(), pt);
        }
    }

    /// Published FF3-1 vectors: key, tweak, alphabet, plaintext, ciphertext.
    const VECTORS: &[(&str, &str, &str, &str, &str)] = &[
        (
            "2DE79D232DF5585D68CE47882AE256D6",
            "CBD09280979564",
            "0123456789",
            "3992520240",
            "8901801106",
        ),
        (
            "01C63017111438F7FC8E24EB16C71AB5",
            "C4E822DCD09F27",
            "0123456789",
            "60761757463116869318437658042297305934914824457484538562",
            "35637144092473838892796702739628394376915177448290847293",
        ),
        (
            "718385E6542534604419E83CE387A437",
            "B6F35084FA90E1",
            "abcdefghijklmnopqrstuvwxyz",
            "wfmwlrorcd",
            "ywowehycyd",
        ),
        (
            "F62EDB777A671075D47563F3A1E9AC797AA706A2D8E02FC8",
            "493B8451BF6716",
            "0123456789",
            "4406616808",
            "1807744762",
        ),
        (
            "1FAA03EFF55A06F8FAB3F1DC57127D493E2F8F5C365540467A3A055BDBE6481D",
            "4D67130C030445",
            "0123456789",
            "3679409436",
            "1735794859",
        ),
    ];

    #[test]
    fn cross_check_published_vectors() {
        for &(key, tweak, symbols, plaintext, expected) in VECTORS {
            let key = hex::decode(key).unwrap();
            let tweak = hex::decode(tweak).unwrap();
            let cipher = Ff3Cipher::new(&key, &tweak)
                .unwrap()
                .with_alphabet(Alphabet::new(symbols).unwrap());

            let ciphertext = cipher.encrypt(plaintext).unwrap();
            assert_eq!(ciphertext, expected, "key length {}", key.len());
            assert_eq!(cipher.decrypt(&ciphertext).unwrap(), plaintext);

            let tweak: [u8; 7] = tweak.as_slice().try_into().unwrap();
            let digits: Vec<u32> = plaintext
                .chars()
                .map(|c| symbols.find(c).unwrap() as u32)
                .collect();
            let reference_ct: String = reference(&key, &tweak, symbols.len() as u32, &digits, true)
                .into_iter()
                .map(|d| symbols.as_bytes()[d as usize] as char)
                .collect();
            assert_eq!(reference_ct, expected);
        }
    }

    const TWEAK: [u8; 7] = [0xd8, 0xe7, 0x92, 0x0a, 0xfa, 0x33, 0x0a];

    #[test]
    fn cross_check_radix_10_all_key_sizes() {
        for len in [16, 24, 32] {
            let key: Vec<u8> = (0..len as u8).map(|i| i.wrapping_mul(37) ^ 0x5a).collect();
            check(Alphabet::digits(), &key, &TWEAK);
        }
    }

    #[test]
    fn cross_check_radix_16_all_key_sizes() {
        for len in [16, 24, 32] {
            let key = vec![0xa5u8; len];
            check(Alphabet::new("0123456789abcdef").unwrap(), &key, &TWEAK);
        }
    }

    #[test]
    fn cross_check_radix_36_all_key_sizes() {
        let symbols = "0123456789abcdefghijklmnopqrstuvwxyz";
        for len in [16, 24, 32] {
            let key: Vec<u8> = (0..len as u8).collect();
            check(Alphabet::new(symbols).unwrap(), &key, &[0; 7]);
        }
    }

    #[test]
    fn cross_check_decimal_sample() {
        let key = [
            0xefu8, 0x43, 0x59, 0xd8, 0xd5, 0x80, 0xaa, 0x4f, 0x7f, 0x03, 0x6d, 0x6f, 0x04, 0xfc,
            0x6a, 0x94,
        ];
        let cipher = Ff3Cipher::new(&key, &TWEAK)
            .unwrap()
            .with_alphabet(Alphabet::digits());

        let plaintext = "890121234567890000";
        let ciphertext = cipher.encrypt(plaintext).unwrap();

        println!("FF3-1-128 Decimal Test:");
        println!("  Key:        {}", hex::encode(key));
        println!("  Tweak:      {}", hex::encode(TWEAK));
        println!("  Plaintext:  {}", plaintext);
        println!("  Ciphertext: {}", ciphertext);

        let digits: Vec<u32> = plaintext.chars().map(|c| c as u32 - '0' as u32).collect();
        let expected: String = reference(&key, &TWEAK, 10, &digits, true)
            .into_iter()
            .map(|d| char::from(b'0' + d as u8))
            .collect();
        assert_eq!(ciphertext, expected);
        assert_eq!(cipher.decrypt(&ciphertext).unwrap(), plaintext);
    }
}
