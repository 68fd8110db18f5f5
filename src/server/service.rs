use super::request::parse_request;
use super::response::{write_json_error, write_response};
use crate::body::assemble;
use crate::error::HttpError;
use crate::exchange::{Exchange, Request, Response, CORRELATION_HEADER};
use crate::router::Router;
use may_minihttp::{HttpService, Request as HttpRequest, Response as HttpResponse};
use std::io;
use std::sync::Arc;
use tracing::{error, info};

/// Receives a failed exchange: the original request, a fresh response and
/// the error. Only this handler writes a failure body.
pub trait ErrorExchangeHandler: Send + Sync {
    fn handle(&self, request: &Request, response: &mut Response, error: &HttpError);
}

impl<F> ErrorExchangeHandler for F
where
    F: Fn(&Request, &mut Response, &HttpError) + Send + Sync,
{
    fn handle(&self, request: &Request, response: &mut Response, error: &HttpError) {
        self(request, response, error)
    }
}

/// Default error handler: a white-label JSON body carrying the status,
/// reason and request path.
pub struct WhiteLabelErrorHandler;

impl ErrorExchangeHandler for WhiteLabelErrorHandler {
    fn handle(&self, request: &Request, response: &mut Response, error: &HttpError) {
        response.set_status(error.status());
        response.set_header("content-type", "application/json");
        let body = serde_json::json!({
            "status": error.status(),
            "error": error.reason(),
            "message": error.to_string(),
            "path": request.raw_path,
        });
        let _ = response.body().raw(body.to_string());
    }
}

/// `may_minihttp` service that routes every request through a [`Router`].
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
    error_handler: Arc<dyn ErrorExchangeHandler>,
}

impl RouterService {
    pub fn new(router: Arc<Router>) -> Self {
        RouterService {
            router,
            error_handler: Arc::new(WhiteLabelErrorHandler),
        }
    }

    /// Replace the error exchange handler.
    pub fn with_error_handler(mut self, handler: impl ErrorExchangeHandler + 'static) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    fn write_error(
        &self,
        res: &mut HttpResponse,
        request: &Request,
        error: &HttpError,
    ) -> io::Result<()> {
        let mut response = Response::new();
        response.set_status(error.status());
        response.set_header(CORRELATION_HEADER, &request.correlation_id.to_string());
        for (name, value) in error.extra_headers() {
            response.set_header(name, &value);
        }
        self.error_handler.handle(request, &mut response, error);

        let declared = response.declared_content_length();
        let assembled = assemble(response.take_body(), declared).and_then(|body| body.collect());
        match assembled {
            Ok(collected) => {
                info!(
                    correlation_id = %request.correlation_id,
                    status = response.status(),
                    %error,
                    "error response written"
                );
                write_response(res, response.status(), response.headers(), collected, false);
                Ok(())
            }
            Err(second) => {
                // a failure inside error handling cannot be recovered;
                // the connection is reset
                error!(
                    correlation_id = %request.correlation_id,
                    first = %error,
                    second = %second,
                    "error handler failed, resetting connection"
                );
                Err(io::Error::other("error handler failed"))
            }
        }
    }
}

impl HttpService for RouterService {
    fn call(&mut self, req: HttpRequest, res: &mut HttpResponse) -> io::Result<()> {
        let request = match parse_request(req) {
            Ok(request) => request,
            Err(error) => {
                // nothing routable to hand the error handler
                write_json_error(
                    res,
                    error.status(),
                    serde_json::json!({
                        "status": error.status(),
                        "error": error.reason(),
                        "message": error.to_string(),
                    }),
                );
                return Ok(());
            }
        };
        let suppress_body = request.method == http::Method::HEAD;

        let mut exchange = Exchange {
            request,
            response: Response::new(),
        };
        match self.router.handle(&mut exchange) {
            Ok(()) => {
                exchange.response.set_header(
                    CORRELATION_HEADER,
                    &exchange.request.correlation_id.to_string(),
                );
                let declared = exchange.response.declared_content_length();
                let assembled =
                    assemble(exchange.response.take_body(), declared).and_then(|body| body.collect());
                match assembled {
                    Ok(collected) => {
                        info!(
                            correlation_id = %exchange.request.correlation_id,
                            method = %exchange.request.method,
                            path = %exchange.request.path,
                            status = exchange.response.status(),
                            "request completed"
                        );
                        write_response(
                            res,
                            exchange.response.status(),
                            exchange.response.headers(),
                            collected,
                            suppress_body,
                        );
                        Ok(())
                    }
                    Err(assembly_error) => {
                        self.write_error(res, &exchange.request, &assembly_error)
                    }
                }
            }
            Err(routing_error) => self.write_error(res, &exchange.request, &routing_error),
        }
    }
}
