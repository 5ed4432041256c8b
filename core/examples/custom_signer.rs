use bytes::Bytes;
use http::request::Parts;
use sigv2_core::hash::base64_hmac_sha256;
use sigv2_core::{
    Context, Error, OsEnv, ProvideCredential, Result, SignRequest, Signer, SigningCredential,
};

// A shared-secret credential
#[derive(Clone, Debug)]
struct MyCredential {
    api_key: String,
    api_secret: String,
}

impl SigningCredential for MyCredential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

// Load the credential from environment variables
#[derive(Debug)]
struct MyCredentialLoader;

#[async_trait::async_trait]
impl ProvideCredential for MyCredentialLoader {
    type Credential = MyCredential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let api_key = ctx.env_var("MY_API_KEY").unwrap_or_default();
        let api_secret = ctx.env_var("MY_API_SECRET").unwrap_or_default();

        if api_key.is_empty() || api_secret.is_empty() {
            println!("No credentials found in environment, using demo credentials");
            return Ok(Some(MyCredential {
                api_key: "demo-api-key".to_string(),
                api_secret: "demo-api-secret".to_string(),
            }));
        }

        Ok(Some(MyCredential {
            api_key,
            api_secret,
        }))
    }
}

// Sign the method and path with the secret
#[derive(Debug)]
struct MyRequestSigner;

#[async_trait::async_trait]
impl SignRequest for MyRequestSigner {
    type Credential = MyCredential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        req: &mut Parts,
        _body: Option<&Bytes>,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::config_invalid("no credential provided"))?;

        let message = format!("{}\n{}", req.method, req.uri.path());
        let signature = base64_hmac_sha256(cred.api_secret.as_bytes(), message.as_bytes());

        req.headers.insert("x-api-key", cred.api_key.parse()?);
        req.headers.insert("x-api-signature", signature.parse()?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new().with_env(OsEnv);
    let signer = Signer::new(ctx, MyCredentialLoader, MyRequestSigner);

    let (mut parts, _) = http::Request::get("https://api.example.com/v1/users")
        .body(())?
        .into_parts();

    match signer.sign(&mut parts, None).await {
        Ok(_) => {
            println!("Request signed successfully!");
            println!("Headers: {:?}", parts.headers);
        }
        Err(e) => {
            eprintln!("Failed to sign request: {}", e);
        }
    }

    Ok(())
}
