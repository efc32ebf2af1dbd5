use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_sesv2::Client as SesClient;

/// Shared AWS clients, built once at cold start and passed into every
/// handler. Handlers take clients as arguments instead of reaching for
/// global SDK singletons.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub cognito_client: CognitoClient,
    pub ses_client: SesClient,
}

impl AppState {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            dynamo_client: DynamoClient::new(config),
            cognito_client: CognitoClient::new(config),
            ses_client: SesClient::new(config),
        }
    }
}
