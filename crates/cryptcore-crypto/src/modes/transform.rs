//! Streaming encrypt/decrypt transform shared by every mode.

use cryptcore_types::{CipherMode, CryptoError, Direction, PaddingMode};
use zeroize::{Zeroize, Zeroizing};

use super::{cbc, cfb, cts, ecb, ofb, padding};
use crate::provider::BlockCipher;

/// Largest supported block width; PKCS#7 pad bytes must fit in a `u8`.
pub(crate) const MAX_BLOCK_SIZE: usize = 255;

/// Mode parameters used to construct a [`CipherTransform`].
///
/// ```
/// use cryptcore_crypto::modes::{CipherMode, ModeParams, PaddingMode};
///
/// let params = ModeParams::new(CipherMode::Cfb)
///     .with_iv(&[0u8; 16])
///     .with_feedback_size(1)
///     .with_padding(PaddingMode::None);
/// assert_eq!(params.feedback_size(), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeParams {
    mode: CipherMode,
    padding: PaddingMode,
    iv: Option<Vec<u8>>,
    feedback_size: Option<usize>,
}

impl ModeParams {
    /// Parameters for `mode` with PKCS#7 padding and no IV.
    pub fn new(mode: CipherMode) -> Self {
        Self {
            mode,
            padding: PaddingMode::default(),
            iv: None,
            feedback_size: None,
        }
    }

    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    /// Initialization vector; must be exactly one block long.
    pub fn with_iv(mut self, iv: &[u8]) -> Self {
        self.iv = Some(iv.to_vec());
        self
    }

    /// CFB segment size in bytes (`1..=block_size`). Defaults to a full block.
    pub fn with_feedback_size(mut self, bytes: usize) -> Self {
        self.feedback_size = Some(bytes);
        self
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub fn feedback_size(&self) -> Option<usize> {
        self.feedback_size
    }

    /// Build an encrypting transform over `cipher`.
    pub fn encryptor<C: BlockCipher>(&self, cipher: C) -> Result<CipherTransform<C>, CryptoError> {
        CipherTransform::new(cipher, None, Direction::Encrypt, self)
    }

    /// Build a decrypting transform over `cipher`.
    ///
    /// CTS decryption also encrypts (for messages shorter than a block), so
    /// the cipher is cloned into a second handle for that path.
    pub fn decryptor<C: BlockCipher + Clone>(
        &self,
        cipher: C,
    ) -> Result<CipherTransform<C>, CryptoError> {
        let keystream = match self.mode {
            CipherMode::Cts => Some(cipher.clone()),
            _ => None,
        };
        CipherTransform::new(cipher, keystream, Direction::Decrypt, self)
    }
}

/// Mutable chaining state: the IV register and the lookahead buffer.
///
/// `temp[..temp_size]` holds input bytes not yet emitted (ECB, CBC, CTS).
/// CFB and OFB keep the current keystream block in `temp[..block_size]`
/// with `temp_size` as the read position; CFB collects the segment's
/// ciphertext in `temp[block_size..]`.
pub(crate) struct ChainState {
    pub(crate) block_size: usize,
    pub(crate) feedback_size: usize,
    pub(crate) iv: Vec<u8>,
    pub(crate) temp: Vec<u8>,
    pub(crate) temp_size: usize,
}

impl ChainState {
    /// Write the first `emit` bytes of `temp[..temp_size] ++ input` to
    /// `output` and keep the rest buffered.
    fn take_blocks(&mut self, input: &[u8], output: &mut [u8], emit: usize) {
        let from_temp = emit.min(self.temp_size);
        output[..from_temp].copy_from_slice(&self.temp[..from_temp]);
        let from_input = emit - from_temp;
        output[from_temp..emit].copy_from_slice(&input[..from_input]);

        self.temp.copy_within(from_temp..self.temp_size, 0);
        self.temp_size -= from_temp;

        let rest = &input[from_input..];
        self.temp[self.temp_size..self.temp_size + rest.len()].copy_from_slice(rest);
        self.temp_size += rest.len();
    }

    fn wipe(&mut self) {
        self.iv.zeroize();
        self.temp.zeroize();
        self.temp_size = 0;
    }
}

impl Drop for ChainState {
    fn drop(&mut self) {
        self.wipe();
    }
}

/// A streaming block cipher transform bound to one mode and direction.
///
/// Feed data with [`transform_block`](Self::transform_block) in chunks of
/// any size, then call [`transform_final_block`](Self::transform_final_block)
/// exactly once. ECB and CBC decryption hold back the newest block until
/// they know whether it carries padding; CTS holds back the final two.
///
/// The IV and buffered data are wiped when the transform is finalized or
/// dropped.
pub struct CipherTransform<C: BlockCipher> {
    cipher: C,
    /// Encrypt handle for CTS decryption of sub-block messages.
    keystream: Option<C>,
    mode: CipherMode,
    direction: Direction,
    padding: PaddingMode,
    state: ChainState,
    finalized: bool,
}

impl<C: BlockCipher> CipherTransform<C> {
    /// Create a transform. Prefer [`ModeParams::encryptor`] and
    /// [`ModeParams::decryptor`].
    ///
    /// `keystream` is the secondary encrypt handle; it is required for CTS
    /// decryption and ignored otherwise.
    pub fn new(
        cipher: C,
        keystream: Option<C>,
        direction: Direction,
        params: &ModeParams,
    ) -> Result<Self, CryptoError> {
        let mode = params.mode;
        let block_size = cipher.block_size();
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(CryptoError::InvalidArg);
        }

        let iv = match (mode.requires_iv(), &params.iv) {
            (true, Some(iv)) if iv.len() == block_size => iv.clone(),
            (true, _) => return Err(CryptoError::InvalidIvLength),
            (false, Some(_)) => return Err(CryptoError::InvalidArg),
            (false, None) => Vec::new(),
        };

        let feedback_size = match (mode, params.feedback_size) {
            (_, None) => block_size,
            (CipherMode::Cfb, Some(k)) if (1..=block_size).contains(&k) => k,
            _ => return Err(CryptoError::InvalidArg),
        };

        let keystream = match (mode, direction) {
            (CipherMode::Cts, Direction::Decrypt) => {
                Some(keystream.ok_or(CryptoError::InvalidArg)?)
            }
            _ => None,
        };

        let temp_len = match mode {
            CipherMode::Ecb | CipherMode::Cbc | CipherMode::Ofb => block_size,
            CipherMode::Cfb | CipherMode::Cts => 2 * block_size,
        };

        let mut state = ChainState {
            block_size,
            feedback_size,
            iv,
            temp: vec![0u8; temp_len],
            temp_size: 0,
        };
        match mode {
            CipherMode::Cfb => cfb::load_keystream(&cipher, &mut state)?,
            CipherMode::Ofb => ofb::reset(&mut state),
            _ => {}
        }

        log::debug!(
            "cipher transform: mode={mode} direction={direction} padding={} block_size={block_size}",
            params.padding
        );
        Ok(Self {
            cipher,
            keystream,
            mode,
            direction,
            padding: params.padding,
            state,
            finalized: false,
        })
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Configured padding. CFB, OFB and CTS never pad.
    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn block_size(&self) -> usize {
        self.state.block_size
    }

    /// CFB segment size in bytes; the block size for every other mode.
    pub fn feedback_size(&self) -> usize {
        self.state.feedback_size
    }

    /// Natural input granularity: 1 for the byte-oriented modes.
    pub fn input_block_size(&self) -> usize {
        if self.mode.is_stream() {
            1
        } else {
            self.state.block_size
        }
    }

    pub fn output_block_size(&self) -> usize {
        self.input_block_size()
    }

    /// Every mode accepts any number of bytes per call.
    pub fn can_transform_multiple_blocks(&self) -> bool {
        true
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of bytes the next `transform_block(input)` call will write.
    pub fn output_len(&self, input_len: usize) -> usize {
        let bs = self.state.block_size;
        let total = self.state.temp_size + input_len;
        match (self.mode, self.direction, self.padding) {
            (CipherMode::Cfb | CipherMode::Ofb, _, _) => input_len,
            (CipherMode::Cts, _, _) if total > 2 * bs => (total - bs - 1) / bs * bs,
            (CipherMode::Cts, _, _) => 0,
            (_, Direction::Encrypt, _) | (_, Direction::Decrypt, PaddingMode::None) => {
                total / bs * bs
            }
            (_, Direction::Decrypt, _) if total == 0 => 0,
            (_, Direction::Decrypt, _) => (total - 1) / bs * bs,
        }
    }

    /// Process `input`, writing every byte that is ready to `output`.
    ///
    /// Returns the number of bytes written. `output` must hold at least
    /// [`output_len(input.len())`](Self::output_len) bytes; the check happens
    /// before any state changes.
    pub fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CryptoError> {
        self.ensure_active()?;
        let emit = self.output_len(input.len());
        if output.len() < emit {
            return Err(CryptoError::BufferTooSmall {
                need: emit,
                got: output.len(),
            });
        }
        log::trace!(
            "{} {}: {} bytes in, {emit} bytes out",
            self.mode,
            self.direction,
            input.len()
        );

        let output = &mut output[..emit];
        match self.mode {
            CipherMode::Cfb => cfb::apply_keystream(&self.cipher, &mut self.state, self.direction, input, output)?,
            CipherMode::Ofb => ofb::apply_keystream(&self.cipher, &mut self.state, input, output)?,
            CipherMode::Ecb | CipherMode::Cbc | CipherMode::Cts => {
                self.state.take_blocks(input, output, emit);
                self.process_blocks(output)?;
            }
        }
        Ok(emit)
    }

    /// Process the remaining `input` plus anything buffered, apply or strip
    /// padding, and return the final bytes.
    ///
    /// The transform is spent afterwards: its state is wiped and further
    /// calls fail with [`CryptoError::TransformFinalized`].
    pub fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.ensure_active()?;
        self.finalized = true;
        let result = self.finish(input);
        self.state.wipe();
        if let Ok(out) = &result {
            log::debug!("{} {} finalized: {} bytes", self.mode, self.direction, out.len());
        }
        result
    }

    fn ensure_active(&self) -> Result<(), CryptoError> {
        if self.finalized {
            return Err(CryptoError::TransformFinalized);
        }
        Ok(())
    }

    /// Run whole blocks through the ECB/CBC chain in place. CTS shares the
    /// CBC chain for every block before the final two.
    fn process_blocks(&mut self, blocks: &mut [u8]) -> Result<(), CryptoError> {
        let bs = self.state.block_size;
        match (self.mode, self.direction) {
            (CipherMode::Ecb, Direction::Encrypt) => ecb::encrypt_blocks(&self.cipher, bs, blocks),
            (CipherMode::Ecb, Direction::Decrypt) => ecb::decrypt_blocks(&self.cipher, bs, blocks),
            (_, Direction::Encrypt) => cbc::encrypt_blocks(&self.cipher, &mut self.state.iv, blocks),
            (_, Direction::Decrypt) => cbc::decrypt_blocks(&self.cipher, &mut self.state.iv, blocks),
        }
    }

    fn finish(&mut self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let bs = self.state.block_size;
        match self.mode {
            CipherMode::Cfb | CipherMode::Ofb => {
                let mut out = vec![0u8; input.len()];
                if self.mode == CipherMode::Cfb {
                    cfb::apply_keystream(&self.cipher, &mut self.state, self.direction, input, &mut out)?;
                } else {
                    ofb::apply_keystream(&self.cipher, &mut self.state, input, &mut out)?;
                }
                Ok(out)
            }
            CipherMode::Ecb | CipherMode::Cbc | CipherMode::Cts => {
                // Room for a PKCS#7 block so padding never reallocates.
                let mut data = Zeroizing::new(Vec::with_capacity(self.state.temp_size + input.len() + bs));
                data.extend_from_slice(&self.state.temp[..self.state.temp_size]);
                data.extend_from_slice(input);

                match (self.mode, self.direction) {
                    (CipherMode::Cts, Direction::Encrypt) => {
                        cts::encrypt_final(&self.cipher, &mut self.state, &mut data)?;
                        Ok(core::mem::take(&mut *data))
                    }
                    (CipherMode::Cts, Direction::Decrypt) => {
                        cts::decrypt_final(&self.cipher, self.keystream.as_ref(), &mut self.state, &mut data)?;
                        Ok(data.to_vec())
                    }
                    (_, Direction::Encrypt) => {
                        padding::pad(self.padding, bs, &mut data)?;
                        self.process_blocks(&mut data)?;
                        Ok(core::mem::take(&mut *data))
                    }
                    (_, Direction::Decrypt) => {
                        if data.len() % bs != 0 {
                            return Err(CryptoError::NotBlockAligned {
                                len: data.len(),
                                block_size: bs,
                            });
                        }
                        self.process_blocks(&mut data)?;
                        let keep = padding::unpadded_len(self.padding, bs, &data);
                        Ok(data[..keep].to_vec())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_cipher::ToyCipher;

    const IV8: [u8; 8] = [0x10, 0x21, 0x32, 0x43, 0x54, 0x65, 0x76, 0x87];

    fn params(mode: CipherMode, padding: PaddingMode) -> ModeParams {
        let p = ModeParams::new(mode).with_padding(padding);
        if mode.requires_iv() {
            p.with_iv(&IV8)
        } else {
            p
        }
    }

    fn feed(t: &mut CipherTransform<ToyCipher>, data: &[u8], chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for piece in data.chunks(chunk.max(1)) {
            let mut buf = vec![0u8; t.output_len(piece.len())];
            let n = t.transform_block(piece, &mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
        }
        out.extend(t.transform_final_block(&[]).unwrap());
        out
    }

    #[test]
    fn test_param_validation() {
        let cipher = ToyCipher::new(8);
        let cbc = ModeParams::new(CipherMode::Cbc);
        assert!(matches!(cbc.encryptor(cipher.clone()), Err(CryptoError::InvalidIvLength)));
        let short_iv = cbc.clone().with_iv(&[0u8; 7]);
        assert!(matches!(short_iv.encryptor(cipher.clone()), Err(CryptoError::InvalidIvLength)));

        let ecb_iv = ModeParams::new(CipherMode::Ecb).with_iv(&IV8);
        assert!(matches!(ecb_iv.encryptor(cipher.clone()), Err(CryptoError::InvalidArg)));

        let cbc_fb = params(CipherMode::Cbc, PaddingMode::Pkcs7).with_feedback_size(1);
        assert!(matches!(cbc_fb.encryptor(cipher.clone()), Err(CryptoError::InvalidArg)));
        for bad in [0, 9] {
            let cfb = params(CipherMode::Cfb, PaddingMode::None).with_feedback_size(bad);
            assert!(matches!(cfb.encryptor(cipher.clone()), Err(CryptoError::InvalidArg)));
        }

        let cts = params(CipherMode::Cts, PaddingMode::None);
        assert!(matches!(
            CipherTransform::new(cipher, None, Direction::Decrypt, &cts),
            Err(CryptoError::InvalidArg)
        ));
    }

    #[test]
    fn test_block_sizes() {
        let cipher = ToyCipher::new(8);
        let cbc = params(CipherMode::Cbc, PaddingMode::Pkcs7).encryptor(cipher.clone()).unwrap();
        assert_eq!(cbc.input_block_size(), 8);
        assert_eq!(cbc.output_block_size(), 8);
        assert_eq!(cbc.feedback_size(), 8);
        assert!(cbc.can_transform_multiple_blocks());

        let cfb = params(CipherMode::Cfb, PaddingMode::None)
            .with_feedback_size(2)
            .decryptor(cipher)
            .unwrap();
        assert_eq!(cfb.input_block_size(), 1);
        assert_eq!(cfb.feedback_size(), 2);
        assert_eq!(cfb.direction(), Direction::Decrypt);
    }

    #[test]
    fn test_ecb_encrypt_emits_whole_blocks() {
        let mut t = params(CipherMode::Ecb, PaddingMode::Pkcs7).encryptor(ToyCipher::new(8)).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(t.transform_block(b"abc", &mut out).unwrap(), 0);
        assert_eq!(t.transform_block(b"defghijklm", &mut out).unwrap(), 8);
        assert_eq!(t.transform_block(b"nop", &mut out).unwrap(), 8);
        assert_eq!(t.transform_final_block(&[]).unwrap().len(), 8);
    }

    #[test]
    fn test_decrypt_holds_back_last_block() {
        let cipher = ToyCipher::new(8);
        let ct = params(CipherMode::Cbc, PaddingMode::Pkcs7)
            .encryptor(cipher.clone())
            .unwrap()
            .transform_final_block(b"0123456789abcdef")
            .unwrap();
        assert_eq!(ct.len(), 24);

        let mut dec = params(CipherMode::Cbc, PaddingMode::Pkcs7).decryptor(cipher.clone()).unwrap();
        let mut out = [0u8; 24];
        // A single aligned block stays buffered: it might be the padding.
        assert_eq!(dec.transform_block(&ct[..8], &mut out).unwrap(), 0);
        assert_eq!(dec.transform_block(&ct[8..], &mut out).unwrap(), 16);
        assert_eq!(&out[..16], b"0123456789abcdef");
        assert!(dec.transform_final_block(&[]).unwrap().is_empty());

        // Without padding every complete block is released immediately.
        let ct = params(CipherMode::Ecb, PaddingMode::None)
            .encryptor(cipher.clone())
            .unwrap()
            .transform_final_block(b"01234567")
            .unwrap();
        let mut dec = params(CipherMode::Ecb, PaddingMode::None).decryptor(cipher).unwrap();
        assert_eq!(dec.transform_block(&ct, &mut out).unwrap(), 8);
        assert_eq!(&out[..8], b"01234567");
    }

    #[test]
    fn test_cts_lookahead() {
        let mut t = params(CipherMode::Cts, PaddingMode::None).encryptor(ToyCipher::new(8)).unwrap();
        let mut out = [0u8; 32];
        assert_eq!(t.transform_block(&[1u8; 16], &mut out).unwrap(), 0);
        assert_eq!(t.transform_block(&[2u8; 1], &mut out).unwrap(), 8);
        assert_eq!(t.transform_block(&[3u8; 7], &mut out).unwrap(), 0);
        assert_eq!(t.transform_final_block(&[]).unwrap().len(), 16);
    }

    #[test]
    fn test_buffer_too_small_leaves_state() {
        let mut t = params(CipherMode::Cbc, PaddingMode::Pkcs7).encryptor(ToyCipher::new(8)).unwrap();
        let mut small = [0u8; 4];
        assert!(matches!(
            t.transform_block(&[0u8; 8], &mut small),
            Err(CryptoError::BufferTooSmall { need: 8, got: 4 })
        ));
        // Nothing was consumed by the failed call.
        assert_eq!(t.output_len(0), 0);
        assert_eq!(t.transform_final_block(&[]).unwrap().len(), 8);
    }

    #[test]
    fn test_finalized_transform_is_spent() {
        let mut t = params(CipherMode::Ofb, PaddingMode::None).encryptor(ToyCipher::new(8)).unwrap();
        assert!(t.transform_final_block(b"abc").is_ok());
        assert!(t.is_finalized());
        assert!(matches!(t.transform_final_block(b"abc"), Err(CryptoError::TransformFinalized)));
        assert!(matches!(
            t.transform_block(b"abc", &mut [0u8; 3]),
            Err(CryptoError::TransformFinalized)
        ));
    }

    #[test]
    fn test_empty_input() {
        let cipher = ToyCipher::new(8);
        for mode in [CipherMode::Ecb, CipherMode::Cbc, CipherMode::Cfb, CipherMode::Ofb, CipherMode::Cts] {
            let mut dec = params(mode, PaddingMode::Pkcs7).decryptor(cipher.clone()).unwrap();
            assert!(dec.transform_final_block(&[]).unwrap().is_empty(), "{mode}");
        }
        let mut enc = params(CipherMode::Cbc, PaddingMode::Zeros).encryptor(cipher).unwrap();
        assert!(enc.transform_final_block(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unaligned_ciphertext_rejected() {
        let mut dec = params(CipherMode::Cbc, PaddingMode::Pkcs7).decryptor(ToyCipher::new(8)).unwrap();
        assert!(matches!(
            dec.transform_final_block(&[0u8; 9]),
            Err(CryptoError::NotBlockAligned { len: 9, block_size: 8 })
        ));
        assert!(dec.is_finalized());
    }

    #[test]
    fn test_chunked_matches_one_shot() {
        let cipher = ToyCipher::new(8);
        let msg: Vec<u8> = (0..53u8).collect();
        for mode in [CipherMode::Ecb, CipherMode::Cbc, CipherMode::Cfb, CipherMode::Ofb, CipherMode::Cts] {
            for padding in [PaddingMode::Pkcs7, PaddingMode::Zeros] {
                let p = params(mode, padding);
                let whole = p.encryptor(cipher.clone()).unwrap().transform_final_block(&msg).unwrap();
                for chunk in [1, 3, 8, 13] {
                    let mut enc = p.encryptor(cipher.clone()).unwrap();
                    assert_eq!(feed(&mut enc, &msg, chunk), whole, "{mode} {padding} {chunk}");
                    let mut dec = p.decryptor(cipher.clone()).unwrap();
                    let plain = feed(&mut dec, &whole, chunk);
                    // The message does not end in zero, so zero padding strips cleanly.
                    assert_eq!(plain, msg, "{mode} {padding} {chunk}");
                }
            }
        }
    }
}
